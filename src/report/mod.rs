pub mod markdown;

use crate::tracker::Tracker;
use crate::tracker::stats::TrackerStats;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport<'a> {
    pub generated_at: String,
    pub tracker: &'a Tracker,
    pub stats: TrackerStats,
}

#[derive(Debug)]
pub struct SavedReport {
    pub markdown_path: PathBuf,
    pub json_path: PathBuf,
}

pub fn build_report(tracker: &Tracker) -> ProgressReport<'_> {
    ProgressReport {
        generated_at: Utc::now().to_rfc3339(),
        tracker,
        stats: tracker.stats(),
    }
}

pub fn save_report_files(report: &ProgressReport<'_>, report_dir: &Path) -> Result<SavedReport> {
    fs::create_dir_all(report_dir).with_context(|| {
        format!(
            "Failed to create report directory: {}",
            report_dir.display()
        )
    })?;

    let slug = &report.tracker.slug;
    let markdown_path = report_dir.join(format!("{slug}.md"));
    let json_path = report_dir.join(format!("{slug}.json"));

    let markdown =
        markdown::render_markdown(report.tracker, &report.stats, &report.generated_at);
    fs::write(&markdown_path, markdown).with_context(|| {
        format!(
            "Failed to write Markdown report: {}",
            markdown_path.display()
        )
    })?;

    let json_content =
        serde_json::to_string_pretty(report).context("Failed to serialize report JSON")?;
    fs::write(&json_path, json_content)
        .with_context(|| format!("Failed to write JSON report: {}", json_path.display()))?;

    Ok(SavedReport {
        markdown_path,
        json_path,
    })
}

#[cfg(test)]
mod tests {
    use super::{build_report, save_report_files};
    use crate::tracker::{Day, Tracker};

    #[test]
    fn report_files_are_named_after_the_slug() {
        let dir = tempfile::tempdir().expect("temp dir");
        let tracker = Tracker {
            slug: "go-basics".to_string(),
            title: "Go basics".to_string(),
            description: String::new(),
            start_date: None,
            total_days: 14,
            daily_hours: 1.0,
            milestones: Vec::new(),
            days: vec![Day::new(1, "Tour", Vec::new())],
        };

        let report = build_report(&tracker);
        let saved = save_report_files(&report, &dir.path().join("reports")).expect("save report");

        assert!(saved.markdown_path.ends_with("go-basics.md"));
        let json = std::fs::read_to_string(&saved.json_path).expect("read json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse json");
        assert_eq!(value["tracker"]["slug"], "go-basics");
        assert_eq!(value["stats"]["weeklyStats"].as_array().map(Vec::len), Some(2));
    }
}
