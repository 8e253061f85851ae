pub mod onboard;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "StudyTracker",
    about = "Learning plan import & progress statistics"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Onboard,
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    Doctor,
    /// Run the JSON API in the foreground
    Serve,
    Tracker {
        #[command(subcommand)]
        command: TrackerCommands,
    },
    /// Bulk-import a day-by-day plan (`-` reads stdin)
    Import { slug: String, file: PathBuf },
    Day {
        #[command(subcommand)]
        command: DayCommands,
    },
    Stats {
        slug: String,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write Markdown and JSON progress reports to the report directory
    Report { slug: String },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    Set { key: String, value: String },
    Get { key: String },
}

#[derive(Debug, Subcommand)]
pub enum TrackerCommands {
    Create {
        slug: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        total_days: Option<u32>,
        #[arg(long)]
        daily_hours: Option<f64>,
    },
    List,
    Show {
        slug: String,
    },
    Delete {
        slug: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum DayCommands {
    /// Print a day with its checklist in editable `[x] text (hrN)` form
    Show {
        slug: String,
        day: u32,
    },
    /// Record progress for a day, creating it when missing
    Log {
        slug: String,
        day: u32,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        hours: Option<f64>,
        #[arg(long)]
        mood: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    Delete {
        slug: String,
        day: u32,
    },
    /// Replace a day's checklist from `[x] text (hrN)` lines (`-` reads stdin)
    Checklist {
        slug: String,
        day: u32,
        file: PathBuf,
    },
}
