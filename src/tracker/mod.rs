pub mod parser;
pub mod stats;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub hour: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Skipped,
}

impl DayStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DayStatus::Pending => "pending",
            DayStatus::InProgress => "in-progress",
            DayStatus::Completed => "completed",
            DayStatus::Skipped => "skipped",
        }
    }
}

impl FromStr for DayStatus {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "pending" => Ok(DayStatus::Pending),
            "in-progress" | "in_progress" => Ok(DayStatus::InProgress),
            "completed" | "done" => Ok(DayStatus::Completed),
            "skipped" => Ok(DayStatus::Skipped),
            _ => bail!("Unknown day status: {raw}. Expected pending|in-progress|completed|skipped"),
        }
    }
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Self-reported mood for a day. `Unset` serializes as an empty string.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Great,
    Good,
    Neutral,
    Tough,
    #[default]
    #[serde(rename = "")]
    Unset,
}

impl Mood {
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Great => "great",
            Mood::Good => "good",
            Mood::Neutral => "neutral",
            Mood::Tough => "tough",
            Mood::Unset => "",
        }
    }

    pub fn is_set(self) -> bool {
        self != Mood::Unset
    }
}

impl FromStr for Mood {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "great" => Ok(Mood::Great),
            "good" => Ok(Mood::Good),
            "neutral" => Ok(Mood::Neutral),
            "tough" => Ok(Mood::Tough),
            "" | "none" | "unset" => Ok(Mood::Unset),
            _ => bail!("Unknown mood: {raw}. Expected great|good|neutral|tough"),
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    pub day_number: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: DayStatus,
    #[serde(default)]
    pub hours_logged: f64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub mood: Mood,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
}

impl Day {
    pub fn new(day_number: u32, title: impl Into<String>, checklist: Vec<ChecklistItem>) -> Self {
        Self {
            day_number,
            title: title.into(),
            status: DayStatus::Pending,
            hours_logged: 0.0,
            notes: String::new(),
            mood: Mood::Unset,
            checklist,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub title: String,
    pub day_number: u32,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracker {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub total_days: u32,
    pub daily_hours: f64,
    pub milestones: Vec<Milestone>,
    pub days: Vec<Day>,
}

impl Tracker {
    pub fn stats(&self) -> stats::TrackerStats {
        stats::compute_stats(self.total_days, &self.days)
    }
}

/// Upper bound for day numbers and plan lengths, roughly ten years of daily study.
pub const MAX_DAY_NUMBER: u32 = 3660;
pub const MAX_TOTAL_DAYS: u32 = MAX_DAY_NUMBER;
pub const MAX_DAILY_HOURS: f64 = 24.0;

pub fn validate_day_number(day_number: u32) -> Result<()> {
    if day_number == 0 || day_number > MAX_DAY_NUMBER {
        bail!("Day number must be between 1 and {MAX_DAY_NUMBER}");
    }
    Ok(())
}

pub fn validate_total_days(total_days: u32) -> Result<()> {
    if total_days == 0 || total_days > MAX_TOTAL_DAYS {
        bail!("Total days must be between 1 and {MAX_TOTAL_DAYS}");
    }
    Ok(())
}

pub fn validate_daily_hours(hours: f64) -> Result<()> {
    if !hours.is_finite() || !(0.0..=MAX_DAILY_HOURS).contains(&hours) {
        bail!("Daily hours must be between 0 and {MAX_DAILY_HOURS}");
    }
    Ok(())
}

/// Logged hours accumulate per day, so only a lower bound applies.
pub fn validate_hours_logged(hours: f64) -> Result<()> {
    if !hours.is_finite() || hours < 0.0 {
        bail!("Hours must be a non-negative number");
    }
    Ok(())
}

/// Slugs appear in URLs and report file names, so only `[a-z0-9-]` is accepted.
pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.len() > 64 {
        bail!("Slug must be between 1 and 64 characters");
    }

    let valid = slug
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-');
    if !valid || slug.starts_with('-') || slug.ends_with('-') {
        bail!("Invalid slug: {slug}. Use lowercase letters, digits and inner hyphens");
    }

    Ok(())
}
