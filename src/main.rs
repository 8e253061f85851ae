mod api;
mod cli;
mod config;
mod db;
mod report;
mod tracker;

use crate::cli::onboard::run_onboarding;
use crate::cli::{Cli, Commands, ConfigCommands, DayCommands, TrackerCommands};
use crate::config::Config;
use crate::db::{Database, DayUpdate, NewTracker};
use crate::tracker::parser::{format_checklist_text, parse_checklist_text, parse_plan};
use crate::tracker::{
    Day, DayStatus, Mood, validate_daily_hours, validate_day_number, validate_hours_logged,
    validate_slug, validate_total_days,
};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Onboard => {
            let _ = run_onboarding()?;
            Ok(())
        }
        Commands::Config { command } => handle_config_command(command),
        Commands::Doctor => handle_doctor(),
        Commands::Serve => {
            let config = load_or_default_config()?;
            run_service(config).await
        }
        Commands::Tracker { command } => handle_tracker_command(command),
        Commands::Import { slug, file } => handle_import(&slug, &file),
        Commands::Day { command } => handle_day_command(command),
        Commands::Stats { slug, json } => handle_stats(&slug, json),
        Commands::Report { slug } => handle_report(&slug),
    }
}

fn handle_config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Set { key, value } => {
            let mut config = load_or_default_config()?;
            config.set_value(&key, &value)?;
            config.ensure_bootstrap_files()?;
            config.save()?;

            println!("Config saved: {key} = {value}");
            Ok(())
        }
        ConfigCommands::Get { key } => {
            let config = load_or_default_config()?;
            let value = config
                .get_value(&key)
                .with_context(|| format!("Unsupported config key: {key}"))?;

            println!("{value}");
            Ok(())
        }
    }
}

fn handle_doctor() -> Result<()> {
    let config_path = Config::config_path()?;
    let mut issues = Vec::new();

    if config_path.exists() {
        println!("[OK] config.json found: {}", config_path.display());
    } else {
        println!("[WARN] config.json not found: {}", config_path.display());
        issues.push("config missing".to_string());
    }

    let config = load_or_default_config()?;

    match Database::open(&config.db_path).and_then(|database| database.tracker_count()) {
        Ok(count) => println!(
            "[OK] SQLite reachable: {} ({count} tracker(s))",
            config.db_path.display()
        ),
        Err(error) => {
            println!("[WARN] SQLite check failed: {error}");
            issues.push("db unreachable".to_string());
        }
    }

    if config.report_dir.exists() {
        println!("[OK] report dir exists: {}", config.report_dir.display());
    } else {
        println!("[WARN] report dir missing: {}", config.report_dir.display());
        issues.push("report dir missing".to_string());
    }

    if issues.is_empty() {
        println!("doctor result: no issues");
    } else {
        println!("doctor result: {} warning(s)", issues.len());
    }

    Ok(())
}

async fn run_service(config: Config) -> Result<()> {
    config.ensure_bootstrap_files()?;
    let _ = Database::open(&config.db_path)?;

    let api_config = Arc::new(config);

    info!("StudyTracker service started");

    tokio::select! {
        api_result = api::run_server(api_config) => {
            api_result?;
        }
        _ = signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    Ok(())
}

fn handle_tracker_command(command: TrackerCommands) -> Result<()> {
    let config = load_or_default_config()?;
    let database = Database::open(&config.db_path)?;

    match command {
        TrackerCommands::Create {
            slug,
            title,
            description,
            start_date,
            total_days,
            daily_hours,
        } => {
            validate_slug(&slug)?;
            let start_date = start_date.as_deref().map(parse_date).transpose()?;
            let total_days = total_days.unwrap_or(config.default_total_days);
            validate_total_days(total_days)?;
            let daily_hours = daily_hours.unwrap_or(config.default_daily_hours);
            validate_daily_hours(daily_hours)?;

            let created = database.create_tracker(&NewTracker {
                title: title.unwrap_or_else(|| slug.clone()),
                slug: slug.clone(),
                description,
                start_date,
                total_days,
                daily_hours,
            })?;

            if !created {
                bail!("Tracker already exists: {slug}");
            }
            println!("Tracker created: {slug}");
        }
        TrackerCommands::List => {
            let trackers = database.list_trackers()?;
            if trackers.is_empty() {
                println!("No trackers yet. Create one with `StudyTracker tracker create <slug>`.");
            }
            for summary in trackers {
                println!(
                    "- {} ({}): {}/{} days completed, {} logged",
                    summary.slug,
                    summary.title,
                    summary.days_completed,
                    summary.total_days,
                    summary.days_logged
                );
            }
        }
        TrackerCommands::Show { slug } => {
            let tracker = database
                .load_tracker(&slug)?
                .with_context(|| format!("Tracker not found: {slug}"))?;
            let content =
                serde_json::to_string_pretty(&tracker).context("Failed to serialize tracker")?;
            println!("{content}");
        }
        TrackerCommands::Delete { slug } => {
            if !database.delete_tracker(&slug)? {
                bail!("Tracker not found: {slug}");
            }
            println!("Tracker deleted: {slug}");
        }
    }

    Ok(())
}

fn handle_import(slug: &str, file: &Path) -> Result<()> {
    let config = load_or_default_config()?;
    let mut database = Database::open(&config.db_path)?;
    let tracker_id = database
        .tracker_id(slug)?
        .with_context(|| format!("Tracker not found: {slug}"))?;

    let text = read_input(file)?;
    let plan = parse_plan(&text);
    if plan.is_empty() {
        warn!(slug, "no day headers found, nothing imported");
        println!("No days found in {}", file.display());
        return Ok(());
    }

    let summary = database.import_plan(tracker_id, &plan)?;
    info!(
        slug,
        parsed = summary.parsed,
        created = summary.created,
        updated = summary.updated,
        "bulk import applied"
    );
    println!(
        "Imported {} day(s) into {slug}: {} created, {} updated",
        summary.parsed, summary.created, summary.updated
    );

    Ok(())
}

fn handle_day_command(command: DayCommands) -> Result<()> {
    let config = load_or_default_config()?;
    let database = Database::open(&config.db_path)?;

    match command {
        DayCommands::Show { slug, day } => {
            let tracker_id = database
                .tracker_id(&slug)?
                .with_context(|| format!("Tracker not found: {slug}"))?;
            let entry = database
                .days_for_tracker(tracker_id)?
                .into_iter()
                .find(|entry| entry.day_number == day)
                .with_context(|| format!("Day {day} not found in tracker {slug}"))?;

            println!("Day {} - {} [{}]", entry.day_number, entry.title, entry.status);
            println!("- hours: {}, mood: {}", entry.hours_logged, entry.mood);
            if !entry.notes.is_empty() {
                println!("- notes: {}", entry.notes);
            }
            println!("{}", format_checklist_text(&entry.checklist));
        }
        DayCommands::Log {
            slug,
            day,
            status,
            hours,
            mood,
            notes,
        } => {
            validate_day_number(day)?;
            let update = day_log_update(status.as_deref(), hours, mood.as_deref(), notes)?;

            let tracker_id = database
                .tracker_id(&slug)?
                .with_context(|| format!("Tracker not found: {slug}"))?;

            if database.create_day(tracker_id, &Day::new(day, "", Vec::new()))? {
                info!(slug = %slug, day, "day created");
            }
            database.update_day(tracker_id, day, &update)?;
            println!("Day {day} of {slug} updated");
        }
        DayCommands::Delete { slug, day } => {
            let tracker_id = database
                .tracker_id(&slug)?
                .with_context(|| format!("Tracker not found: {slug}"))?;
            if !database.delete_day(tracker_id, day)? {
                bail!("Day {day} not found in tracker {slug}");
            }
            println!("Day {day} of {slug} deleted");
        }
        DayCommands::Checklist { slug, day, file } => {
            let tracker_id = database
                .tracker_id(&slug)?
                .with_context(|| format!("Tracker not found: {slug}"))?;
            let checklist = parse_checklist_text(&read_input(&file)?);
            let count = checklist.len();

            let update = DayUpdate {
                checklist: Some(checklist),
                ..DayUpdate::default()
            };
            if !database.update_day(tracker_id, day, &update)? {
                bail!("Day {day} not found in tracker {slug}");
            }
            println!("Day {day} of {slug}: checklist replaced with {count} item(s)");
        }
    }

    Ok(())
}

fn day_log_update(
    status: Option<&str>,
    hours: Option<f64>,
    mood: Option<&str>,
    notes: Option<String>,
) -> Result<DayUpdate> {
    if let Some(hours) = hours {
        validate_hours_logged(hours)?;
    }

    Ok(DayUpdate {
        status: status.map(str::parse::<DayStatus>).transpose()?,
        hours_logged: hours,
        mood: mood.map(str::parse::<Mood>).transpose()?,
        notes,
        ..DayUpdate::default()
    })
}

fn handle_stats(slug: &str, as_json: bool) -> Result<()> {
    let config = load_or_default_config()?;
    let database = Database::open(&config.db_path)?;
    let tracker = database
        .load_tracker(slug)?
        .with_context(|| format!("Tracker not found: {slug}"))?;
    let stats = tracker.stats();

    if as_json {
        let content = serde_json::to_string_pretty(&stats).context("Failed to serialize stats")?;
        println!("{content}");
        return Ok(());
    }

    println!("{} ({slug})", tracker.title);
    println!(
        "- completion: {}% ({}/{} days)",
        stats.completion_percent, stats.days_completed, stats.total_days
    );
    println!(
        "- in progress: {}, skipped: {}, pending: {}",
        stats.days_in_progress, stats.days_skipped, stats.days_pending
    );
    println!("- hours logged: {}", stats.total_hours_logged);
    println!(
        "- streak: current {}, longest {}",
        stats.current_streak, stats.longest_streak
    );
    println!(
        "- checklist: {}/{} items done",
        stats.checklist_completed, stats.checklist_total
    );

    Ok(())
}

fn handle_report(slug: &str) -> Result<()> {
    let config = load_or_default_config()?;
    let database = Database::open(&config.db_path)?;
    let tracker = database
        .load_tracker(slug)?
        .with_context(|| format!("Tracker not found: {slug}"))?;

    let progress = report::build_report(&tracker);
    let saved = report::save_report_files(&progress, &config.report_dir)?;

    println!("Report generated: {slug}");
    println!("- Markdown: {}", saved.markdown_path.display());
    println!("- JSON: {}", saved.json_path.display());

    Ok(())
}

fn read_input(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        return Ok(buffer);
    }

    fs::read_to_string(file).with_context(|| format!("Failed to read file: {}", file.display()))
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format: {input}. Example: 2026-02-18"))
}

fn load_or_default_config() -> Result<Config> {
    Config::load().or_else(|_| {
        let config = Config::default();
        config.ensure_bootstrap_files()?;
        config.save()?;
        Ok(config)
    })
}

#[cfg(test)]
mod tests {
    use super::day_log_update;
    use crate::tracker::{DayStatus, Mood};

    #[test]
    fn day_log_rejects_non_finite_or_negative_hours() {
        assert!(day_log_update(None, Some(f64::NAN), None, None).is_err());
        assert!(day_log_update(None, Some(f64::INFINITY), None, None).is_err());
        assert!(day_log_update(None, Some(-1.0), None, None).is_err());
    }

    #[test]
    fn day_log_builds_partial_update() {
        let update = day_log_update(Some("done"), Some(1.5), Some("good"), None)
            .expect("valid day log");

        assert_eq!(update.status, Some(DayStatus::Completed));
        assert_eq!(update.hours_logged, Some(1.5));
        assert_eq!(update.mood, Some(Mood::Good));
        assert!(update.notes.is_none());
        assert!(update.checklist.is_none());
    }
}
