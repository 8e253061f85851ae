use crate::tracker::Tracker;
use crate::tracker::stats::TrackerStats;

pub fn render_markdown(tracker: &Tracker, stats: &TrackerStats, generated_at: &str) -> String {
    let start_date = tracker
        .start_date
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "not set".to_string());

    let planned_hours = f64::from(tracker.total_days) * tracker.daily_hours;
    let hours_ratio = if planned_hours > 0.0 {
        stats.total_hours_logged / planned_hours * 100.0
    } else {
        0.0
    };

    let weekly_rows = if stats.weekly_stats.is_empty() {
        "| - | - | - | - |".to_string()
    } else {
        stats
            .weekly_stats
            .iter()
            .map(|week| {
                format!(
                    "| {} | {} | {} | {} |",
                    week.week,
                    week.completed,
                    week.total,
                    format_hours(week.hours)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mood_rows = if stats.mood_counts.is_empty() {
        "- No mood recorded".to_string()
    } else {
        stats
            .mood_counts
            .iter()
            .map(|(mood, count)| format!("- {mood}: {count}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let milestone_rows = if tracker.milestones.is_empty() {
        "- No milestones".to_string()
    } else {
        tracker
            .milestones
            .iter()
            .map(|milestone| {
                format!(
                    "- [{}] Day {}: {}",
                    if milestone.completed { "x" } else { " " },
                    milestone.day_number,
                    milestone.title
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "# Progress Report - {}\n\nGenerated at {}\n\n## Summary\n- Start date: {}\n- Completion: {}% ({} of {} days)\n- In progress: {} / Skipped: {} / Pending: {}\n- Hours logged: {} of {} planned ({:.0}%)\n- Current streak: {} day(s)\n- Longest streak: {} day(s)\n- Checklist: {} of {} items done\n\n## Weekly Progress\n| Week | Completed | Logged | Hours |\n|------|-----------|--------|-------|\n{}\n\n## Mood\n{}\n\n## Milestones\n{}\n",
        tracker.title,
        generated_at,
        start_date,
        stats.completion_percent,
        stats.days_completed,
        stats.total_days,
        stats.days_in_progress,
        stats.days_skipped,
        stats.days_pending,
        format_hours(stats.total_hours_logged),
        format_hours(planned_hours),
        hours_ratio,
        stats.current_streak,
        stats.longest_streak,
        stats.checklist_completed,
        stats.checklist_total,
        weekly_rows,
        mood_rows,
        milestone_rows
    )
}

fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{hours:.0}h")
    } else {
        format!("{hours:.1}h")
    }
}
