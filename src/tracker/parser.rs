use crate::tracker::{ChecklistItem, MAX_DAY_NUMBER};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Widest `Day N-M` range expanded into individual days. Wider ranges keep only `N`.
const MAX_RANGE_SPAN: u32 = 366;

/// Trimmed from title edges. Brackets stay so `Traits (part 2)` keeps its `)`.
const TITLE_SEPARATORS: &[char] = &[':', '-', '–', '—', '.', ',', '|', '_', '!', '?', ';'];
const ITEM_SEPARATORS: &[char] = &[':', '-', '–', '—', ',', '|', '*'];

static DAY_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:#+\s*)?[*_]*day\s+(\d+)(?:\s*[-–—]\s*(\d+))?")
        .expect("day header pattern is valid")
});

static HOUR_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bhour\s*(\d+)").expect("hour token pattern is valid"));

static HOUR_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\(\s*hour\s*\d+\s*\)\s*$").expect("hour suffix pattern is valid")
});

static HR_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\(\s*hr\s*(\d+)\s*\)\s*$").expect("hr suffix pattern is valid")
});

/// One day produced by a bulk plan. Range headers yield one `PlanDay` per day number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDay {
    pub day_number: u32,
    pub title: String,
    pub checklist: Vec<ChecklistItem>,
}

#[derive(Debug, PartialEq)]
enum PlanLine {
    Header { day_numbers: Vec<u32>, title: String },
    Item { text: String, hour: Option<u32> },
    Ignored,
}

struct OpenBlock {
    day_numbers: Vec<u32>,
    title: String,
    checklist: Vec<ChecklistItem>,
}

impl OpenBlock {
    fn finalize(self, days: &mut Vec<PlanDay>) {
        days.extend(self.day_numbers.iter().map(|&day_number| PlanDay {
            day_number,
            title: self.title.clone(),
            checklist: self.checklist.clone(),
        }));
    }
}

enum ParseState {
    NoOpenBlock,
    BlockOpen(OpenBlock),
}

impl ParseState {
    fn advance(self, line: PlanLine, days: &mut Vec<PlanDay>) -> Self {
        match (self, line) {
            (state, PlanLine::Header { day_numbers, title }) => {
                state.finish(days);
                ParseState::BlockOpen(OpenBlock {
                    day_numbers,
                    title,
                    checklist: Vec::new(),
                })
            }
            (ParseState::BlockOpen(mut block), PlanLine::Item { text, hour }) => {
                let hour = hour.unwrap_or(block.checklist.len() as u32 + 1);
                block.checklist.push(ChecklistItem {
                    text,
                    completed: false,
                    hour,
                });
                ParseState::BlockOpen(block)
            }
            (state, _) => state,
        }
    }

    fn finish(self, days: &mut Vec<PlanDay>) {
        if let ParseState::BlockOpen(block) = self {
            block.finalize(days);
        }
    }
}

/// Parses a free-text learning plan into day blocks, in source order.
///
/// Lines that are neither a `Day N` / `Day N-M` header nor a bullet inside an
/// open day block are dropped. Day numbers are not deduplicated here.
pub fn parse_plan(text: &str) -> Vec<PlanDay> {
    let (mut days, state) = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(classify_line)
        .fold(
            (Vec::new(), ParseState::NoOpenBlock),
            |(mut days, state), line| {
                let next = state.advance(line, &mut days);
                (days, next)
            },
        );

    state.finish(&mut days);
    days
}

/// Parses the single-day checklist form: `[x] text (hrN)` or `text (hrN)`, one per line.
pub fn parse_checklist_text(text: &str) -> Vec<ChecklistItem> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_checklist_line)
        .collect()
}

/// Renders items in the form accepted by [`parse_checklist_text`].
pub fn format_checklist_text(items: &[ChecklistItem]) -> String {
    items
        .iter()
        .map(|item| {
            if item.completed {
                format!("[x] {} (hr{})", item.text, item.hour)
            } else {
                format!("{} (hr{})", item.text, item.hour)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn classify_line(line: &str) -> PlanLine {
    if let Some((day_numbers, title)) = parse_header(line) {
        return PlanLine::Header { day_numbers, title };
    }

    parse_bullet(line)
        .map(|(text, hour)| PlanLine::Item { text, hour })
        .unwrap_or(PlanLine::Ignored)
}

fn parse_header(line: &str) -> Option<(Vec<u32>, String)> {
    let captures = DAY_HEADER.captures(line)?;
    let token = captures.get(0)?;

    let start = captures
        .get(1)
        .and_then(|value| value.as_str().parse::<u32>().ok());
    let end = captures
        .get(2)
        .and_then(|value| value.as_str().parse::<u32>().ok());

    Some((expand_day_numbers(start, end), clean_title(&line[token.end()..])))
}

/// Out-of-range starts (0 or past `MAX_DAY_NUMBER`) open a block that emits nothing.
fn expand_day_numbers(start: Option<u32>, end: Option<u32>) -> Vec<u32> {
    let in_range = |number: u32| (1..=MAX_DAY_NUMBER).contains(&number);
    match (start, end) {
        (Some(start), Some(end))
            if in_range(start) && in_range(end) && end >= start && end - start < MAX_RANGE_SPAN =>
        {
            (start..=end).collect()
        }
        (Some(start), _) if in_range(start) => vec![start],
        _ => Vec::new(),
    }
}

fn clean_title(raw: &str) -> String {
    raw.replace('*', "")
        .trim_matches(|ch: char| ch.is_whitespace() || TITLE_SEPARATORS.contains(&ch))
        .to_string()
}

fn parse_bullet(line: &str) -> Option<(String, Option<u32>)> {
    let body = line
        .strip_prefix('-')
        .or_else(|| line.strip_prefix('*'))?;

    let hour = HOUR_TOKEN
        .captures(body)
        .and_then(|captures| captures.get(1))
        .and_then(|value| value.as_str().parse::<u32>().ok())
        .filter(|hour| *hour > 0);

    let without_suffix = HOUR_SUFFIX.replace(body, "");
    let without_token = HOUR_TOKEN.replace_all(&without_suffix, "");
    let text = without_token
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|ch: char| ch.is_whitespace() || ITEM_SEPARATORS.contains(&ch))
        .to_string();

    (!text.is_empty()).then_some((text, hour))
}

fn parse_checklist_line(line: &str) -> Option<ChecklistItem> {
    let (completed, rest) = match line.get(..3) {
        Some(marker) if marker.eq_ignore_ascii_case("[x]") => (true, &line[3..]),
        Some("[ ]") => (false, &line[3..]),
        _ => (false, line),
    };

    let hour = HR_SUFFIX
        .captures(rest)
        .and_then(|captures| captures.get(1))
        .and_then(|value| value.as_str().parse::<u32>().ok())
        .filter(|hour| *hour > 0)
        .unwrap_or(1);

    let text = HR_SUFFIX.replace(rest, "").trim().to_string();

    (!text.is_empty()).then_some(ChecklistItem {
        text,
        completed,
        hour,
    })
}

#[cfg(test)]
mod tests {
    use super::{PlanDay, format_checklist_text, parse_checklist_text, parse_plan};
    use crate::tracker::ChecklistItem;

    fn item(text: &str, completed: bool, hour: u32) -> ChecklistItem {
        ChecklistItem {
            text: text.to_string(),
            completed,
            hour,
        }
    }

    fn day_numbers(days: &[PlanDay]) -> Vec<u32> {
        days.iter().map(|day| day.day_number).collect()
    }

    #[test]
    fn reparsing_is_deterministic() {
        let text = "Day 1: Setup\n- Hour 1: Install rustup\n- Read the book\nDay 2-3: Ownership\n- Borrowing";

        assert_eq!(parse_plan(text), parse_plan(text));
    }

    #[test]
    fn output_follows_source_order() {
        let text = "Day 3: Third\n- c\nDay 1: First\n- a\nDay 2: Second\n- b";

        assert_eq!(day_numbers(&parse_plan(text)), vec![3, 1, 2]);
    }

    #[test]
    fn range_header_expands_with_independent_checklists() {
        let mut days = parse_plan("Day 2-4: Theme\n- Hour 1: Task A");

        assert_eq!(day_numbers(&days), vec![2, 3, 4]);
        for day in &days {
            assert_eq!(day.title, "Theme");
            assert_eq!(day.checklist, vec![item("Task A", false, 1)]);
        }

        days[0].checklist[0].completed = true;
        assert!(!days[1].checklist[0].completed);
        assert!(!days[2].checklist[0].completed);
    }

    #[test]
    fn range_header_accepts_en_and_em_dashes() {
        assert_eq!(day_numbers(&parse_plan("Day 5–6: Traits")), vec![5, 6]);
        assert_eq!(day_numbers(&parse_plan("Day 8 — 9: Generics")), vec![8, 9]);
    }

    #[test]
    fn hours_default_to_next_sequential_hour() {
        let days = parse_plan("Day 1: X\n- First thing\n- Second thing");

        assert_eq!(
            days[0].checklist,
            vec![item("First thing", false, 1), item("Second thing", false, 2)]
        );
    }

    #[test]
    fn explicit_hour_tokens_are_extracted_and_stripped() {
        let days = parse_plan("Day 1\n- Hour 3: Lifetimes\n- Write tests (Hour 4)\n* hour5 Review");

        assert_eq!(
            days[0].checklist,
            vec![
                item("Lifetimes", false, 3),
                item("Write tests", false, 4),
                item("Review", false, 5),
            ]
        );
    }

    #[test]
    fn blank_items_are_suppressed() {
        let days = parse_plan("Day 1: X\n- Hour 3:\n- \n- Real task");

        assert_eq!(days[0].checklist, vec![item("Real task", false, 1)]);
    }

    #[test]
    fn header_shapes_and_titles() {
        let days = parse_plan("Day 12:\n**Day 3**\nday 7 - Title\n## **Day 9:** Closures!\n");

        let titles = days
            .iter()
            .map(|day| (day.day_number, day.title.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            titles,
            vec![(12, ""), (3, ""), (7, "Title"), (9, "Closures")]
        );
    }

    #[test]
    fn header_without_items_yields_empty_checklist() {
        let days = parse_plan("Day 1: Rest");

        assert_eq!(days.len(), 1);
        assert!(days[0].checklist.is_empty());
    }

    #[test]
    fn prose_and_orphan_bullets_are_dropped() {
        let text = "My 30 day plan\n- orphan bullet before any day\nDay 1: Start\nSome commentary\n- Do it";
        let days = parse_plan(text);

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].checklist, vec![item("Do it", false, 1)]);
    }

    #[test]
    fn star_bullet_mentioning_a_day_is_an_item() {
        let days = parse_plan("Day 1: Start\n* Day 3 recap video");

        assert_eq!(day_numbers(&days), vec![1]);
        assert_eq!(days[0].checklist, vec![item("Day 3 recap video", false, 1)]);
    }

    #[test]
    fn repeated_day_numbers_are_not_deduplicated() {
        let days = parse_plan("Day 1-2: Week theme\nDay 2: Special");

        assert_eq!(day_numbers(&days), vec![1, 2, 2]);
    }

    #[test]
    fn degenerate_ranges() {
        assert_eq!(day_numbers(&parse_plan("Day 5-3: Backwards")), vec![5]);
        assert_eq!(day_numbers(&parse_plan("Day 1-100000: Huge")), vec![1]);
        assert!(parse_plan("Day 0: Nothing\n- swallowed").is_empty());
    }

    #[test]
    fn day_numbers_past_the_cap_are_dropped_with_their_items() {
        let text = "Day 1: Start\n- Setup\nDay 70000000: typo\n- task\nDay 3655-3670: Tail\n- wrap";
        let days = parse_plan(text);

        assert_eq!(day_numbers(&days), vec![1, 3655]);
        assert_eq!(days[0].checklist, vec![item("Setup", false, 1)]);
        assert!(parse_plan("Day 99999999999: overflow\n- task").is_empty());
    }

    #[test]
    fn title_punctuation_is_trimmed_but_brackets_survive() {
        let days = parse_plan("Day 1: Why borrow?\nDay 2: Traits (part 2)");

        assert_eq!(days[0].title, "Why borrow");
        assert_eq!(days[1].title, "Traits (part 2)");
    }

    #[test]
    fn empty_input_yields_no_days() {
        assert!(parse_plan("").is_empty());
        assert!(parse_plan("just some notes\nwithout headers").is_empty());
    }

    #[test]
    fn simple_form_parses_completion_and_hour() {
        let items = parse_checklist_text("[x] Review notes (hr2)\nPlan tomorrow\n\n[X]Refactor (HR 3)");

        assert_eq!(
            items,
            vec![
                item("Review notes", true, 2),
                item("Plan tomorrow", false, 1),
                item("Refactor", true, 3),
            ]
        );
    }

    #[test]
    fn simple_form_drops_empty_items() {
        assert!(parse_checklist_text("[x] (hr2)\n   \n[x]").is_empty());
    }

    #[test]
    fn simple_form_round_trips_through_formatter() {
        let items = vec![item("Read chapter 4", true, 1), item("Exercises", false, 2)];
        let text = format_checklist_text(&items);

        assert_eq!(text, "[x] Read chapter 4 (hr1)\nExercises (hr2)");
        assert_eq!(parse_checklist_text(&text), items);
    }

    #[test]
    fn parsed_plan_feeds_the_aggregator() {
        use crate::tracker::Day;
        use crate::tracker::stats::compute_stats;

        let text = "Day 1: Intro\n- Hour 1: Install\n- Hour 2: Hello world\nDay 2: Basics\n- Variables";
        let days = parse_plan(text)
            .into_iter()
            .map(|plan| Day::new(plan.day_number, plan.title, plan.checklist))
            .collect::<Vec<_>>();

        assert_eq!(days.iter().map(|day| day.day_number).collect::<Vec<_>>(), vec![1, 2]);

        let stats = compute_stats(2, &days);
        assert_eq!(stats.completion_percent, 0);
        assert_eq!(stats.days_pending, 2);
        assert_eq!(stats.checklist_total, 3);
        assert_eq!(stats.checklist_completed, 0);
    }
}
