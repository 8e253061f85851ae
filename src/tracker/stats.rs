use crate::tracker::{Day, DayStatus, MAX_TOTAL_DAYS, Mood};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const DAYS_PER_WEEK: u32 = 7;
const DAYS_PER_MONTH: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekStats {
    pub week: u32,
    pub completed: u32,
    pub total: u32,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthStats {
    pub month: u32,
    pub completed: u32,
    pub total: u32,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerStats {
    pub total_days: u32,
    pub days_logged: u32,
    pub days_completed: u32,
    pub days_skipped: u32,
    pub days_in_progress: u32,
    pub days_pending: u32,
    pub completion_percent: u32,
    pub total_hours_logged: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub checklist_total: u32,
    pub checklist_completed: u32,
    pub mood_counts: BTreeMap<Mood, u32>,
    pub weekly_stats: Vec<WeekStats>,
    pub monthly_stats: Vec<MonthStats>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Bucket {
    completed: u32,
    total: u32,
    hours: f64,
}

/// Derives dashboard statistics from a tracker's days.
///
/// `total_days_target` is the tracker's planned length; completion is measured
/// against it rather than against the number of logged days.
pub fn compute_stats(total_days_target: u32, days: &[Day]) -> TrackerStats {
    let count_status =
        |status: DayStatus| days.iter().filter(|day| day.status == status).count() as u32;

    let days_completed = count_status(DayStatus::Completed);
    let (current_streak, longest_streak) = streaks(days);

    let mood_counts = days
        .iter()
        .filter(|day| day.mood.is_set())
        .fold(BTreeMap::new(), |mut acc, day| {
            *acc.entry(day.mood).or_insert(0_u32) += 1;
            acc
        });

    let weekly_stats = rollup(total_days_target, days, DAYS_PER_WEEK)
        .into_iter()
        .map(|(week, bucket)| WeekStats {
            week,
            completed: bucket.completed,
            total: bucket.total,
            hours: bucket.hours,
        })
        .collect();
    let monthly_stats = rollup(total_days_target, days, DAYS_PER_MONTH)
        .into_iter()
        .map(|(month, bucket)| MonthStats {
            month,
            completed: bucket.completed,
            total: bucket.total,
            hours: bucket.hours,
        })
        .collect();

    TrackerStats {
        total_days: total_days_target,
        days_logged: days.len() as u32,
        days_completed,
        days_skipped: count_status(DayStatus::Skipped),
        days_in_progress: count_status(DayStatus::InProgress),
        days_pending: count_status(DayStatus::Pending),
        completion_percent: completion_percent(days_completed, total_days_target),
        total_hours_logged: days.iter().map(|day| day.hours_logged).sum(),
        current_streak,
        longest_streak,
        checklist_total: days.iter().map(|day| day.checklist.len() as u32).sum(),
        checklist_completed: days
            .iter()
            .flat_map(|day| day.checklist.iter())
            .filter(|item| item.completed)
            .count() as u32,
        mood_counts,
        weekly_stats,
        monthly_stats,
    }
}

fn completion_percent(completed: u32, target: u32) -> u32 {
    if target == 0 {
        return 0;
    }

    (f64::from(completed) * 100.0 / f64::from(target)).round() as u32
}

/// Returns `(current, longest)` over runs of adjacent completed day numbers.
fn streaks(days: &[Day]) -> (u32, u32) {
    let completed = days
        .iter()
        .filter(|day| day.status == DayStatus::Completed)
        .map(|day| day.day_number)
        .collect::<BTreeSet<_>>();

    let (current, longest, _) = completed.iter().fold(
        (0_u32, 0_u32, None::<u32>),
        |(run, longest, previous), &day_number| {
            let run = match previous {
                Some(previous) if day_number == previous + 1 => run + 1,
                _ => 1,
            };
            (run, longest.max(run), Some(day_number))
        },
    );

    (current, longest)
}

/// Buckets days into fixed-size windows numbered from 1.
///
/// Windows covering the planned length are always present and zero-filled.
/// Days logged past the target only add the windows they fall into.
fn rollup(total_days_target: u32, days: &[Day], bucket_size: u32) -> Vec<(u32, Bucket)> {
    let planned = total_days_target.min(MAX_TOTAL_DAYS).div_ceil(bucket_size);
    let mut buckets: BTreeMap<u32, Bucket> = (1..=planned)
        .map(|index| (index, Bucket::default()))
        .collect();

    days.iter()
        .filter(|day| day.day_number > 0)
        .for_each(|day| {
            let bucket = buckets
                .entry((day.day_number - 1) / bucket_size + 1)
                .or_default();
            bucket.total += 1;
            bucket.hours += day.hours_logged;
            if day.status == DayStatus::Completed {
                bucket.completed += 1;
            }
        });

    buckets.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::compute_stats;
    use crate::tracker::{ChecklistItem, Day, DayStatus, Mood};

    fn day(day_number: u32, status: DayStatus) -> Day {
        let mut day = Day::new(day_number, format!("Day {day_number}"), Vec::new());
        day.status = status;
        day
    }

    #[test]
    fn streaks_follow_day_number_adjacency() {
        let days = vec![
            day(1, DayStatus::Completed),
            day(2, DayStatus::Completed),
            day(3, DayStatus::Skipped),
            day(4, DayStatus::Completed),
            day(5, DayStatus::Completed),
            day(6, DayStatus::Completed),
        ];

        let stats = compute_stats(30, &days);
        assert_eq!(stats.longest_streak, 3);
        assert_eq!(stats.current_streak, 3);
    }

    #[test]
    fn streaks_ignore_input_order_and_duplicates() {
        let days = vec![
            day(9, DayStatus::Completed),
            day(1, DayStatus::Completed),
            day(2, DayStatus::Completed),
            day(3, DayStatus::Completed),
            day(2, DayStatus::Completed),
            day(10, DayStatus::InProgress),
        ];

        let stats = compute_stats(10, &days);
        assert_eq!(stats.longest_streak, 3);
        assert_eq!(stats.current_streak, 1);
    }

    #[test]
    fn zero_target_never_divides() {
        let days = vec![day(1, DayStatus::Completed), day(2, DayStatus::Completed)];

        let stats = compute_stats(0, &days);
        assert_eq!(stats.completion_percent, 0);
        assert_eq!(stats.days_completed, 2);
    }

    #[test]
    fn completion_percent_is_relative_to_target() {
        let days = vec![
            day(1, DayStatus::Completed),
            day(2, DayStatus::Completed),
            day(3, DayStatus::InProgress),
        ];

        assert_eq!(compute_stats(3, &days).completion_percent, 67);
        assert_eq!(compute_stats(100, &days).completion_percent, 2);
    }

    #[test]
    fn weekly_buckets_are_contiguous_to_target() {
        let mut first = day(1, DayStatus::Completed);
        first.hours_logged = 2.5;
        let mut second = day(7, DayStatus::Pending);
        second.hours_logged = 1.0;

        let stats = compute_stats(10, &[first, second]);
        assert_eq!(stats.weekly_stats.len(), 2);
        assert_eq!(stats.weekly_stats[0].week, 1);
        assert_eq!(stats.weekly_stats[0].completed, 1);
        assert_eq!(stats.weekly_stats[0].total, 2);
        assert_eq!(stats.weekly_stats[0].hours, 3.5);
        assert_eq!(stats.weekly_stats[1].week, 2);
        assert_eq!(stats.weekly_stats[1].total, 0);
        assert_eq!(stats.weekly_stats[1].hours, 0.0);
        assert_eq!(stats.monthly_stats.len(), 1);
        assert_eq!(stats.monthly_stats[0].total, 2);
    }

    #[test]
    fn overflow_days_add_only_their_own_bucket() {
        let stats = compute_stats(7, &[day(15, DayStatus::Completed)]);

        let weeks: Vec<u32> = stats.weekly_stats.iter().map(|week| week.week).collect();
        assert_eq!(weeks, vec![1, 3]);
        assert_eq!(stats.weekly_stats[0].total, 0);
        assert_eq!(stats.weekly_stats[1].completed, 1);
    }

    #[test]
    fn far_out_day_number_does_not_inflate_rollups() {
        let stats = compute_stats(30, &[day(70_000_000, DayStatus::Completed)]);

        let planned: Vec<u32> = stats.weekly_stats.iter().take(5).map(|week| week.week).collect();
        assert_eq!(planned, vec![1, 2, 3, 4, 5]);
        assert_eq!(stats.weekly_stats.len(), 6);
        assert_eq!(stats.weekly_stats[5].week, 10_000_000);
        assert_eq!(stats.monthly_stats.len(), 2);
    }

    #[test]
    fn oversized_target_is_capped() {
        let stats = compute_stats(u32::MAX, &[]);

        assert_eq!(stats.weekly_stats.len(), 523);
        assert_eq!(stats.monthly_stats.len(), 122);
    }

    #[test]
    fn empty_days_yield_zeroed_stats() {
        let stats = compute_stats(0, &[]);

        assert_eq!(stats.days_logged, 0);
        assert_eq!(stats.total_hours_logged, 0.0);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 0);
        assert!(stats.mood_counts.is_empty());
        assert!(stats.weekly_stats.is_empty());
        assert!(stats.monthly_stats.is_empty());
    }

    #[test]
    fn moods_and_checklists_are_counted() {
        let mut first = day(1, DayStatus::Completed);
        first.mood = Mood::Great;
        first.checklist = vec![
            ChecklistItem {
                text: "Read".to_string(),
                completed: true,
                hour: 1,
            },
            ChecklistItem {
                text: "Write".to_string(),
                completed: false,
                hour: 2,
            },
        ];
        let mut second = day(2, DayStatus::Skipped);
        second.mood = Mood::Great;
        let mut third = day(3, DayStatus::Pending);
        third.mood = Mood::Tough;
        let fourth = day(4, DayStatus::Pending);

        let stats = compute_stats(4, &[first, second, third, fourth]);
        assert_eq!(stats.mood_counts.get(&Mood::Great), Some(&2));
        assert_eq!(stats.mood_counts.get(&Mood::Tough), Some(&1));
        assert_eq!(stats.mood_counts.get(&Mood::Unset), None);
        assert_eq!(stats.checklist_total, 2);
        assert_eq!(stats.checklist_completed, 1);
        assert_eq!(stats.days_skipped, 1);
        assert_eq!(stats.days_pending, 2);
    }

    #[test]
    fn stats_serialize_with_camel_case_keys() {
        let mut first = day(1, DayStatus::Completed);
        first.mood = Mood::Good;

        let value = serde_json::to_value(compute_stats(7, &[first])).expect("serialize stats");
        assert_eq!(value["completionPercent"], 14);
        assert_eq!(value["moodCounts"]["good"], 1);
        assert_eq!(value["weeklyStats"][0]["week"], 1);
    }
}
