use crate::config::{Config, default_report_dir, expand_home};
use crate::db::{Database, NewTracker};
use crate::tracker::{validate_daily_hours, validate_slug, validate_total_days};
use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, theme::ColorfulTheme};

pub fn run_onboarding() -> Result<Config> {
    println!("──────────────────────────────────────────");
    println!("  Welcome to StudyTracker onboarding.");
    println!("──────────────────────────────────────────");

    let theme = ColorfulTheme::default();
    let defaults = Config::default();

    println!("\n[1/4] API port");
    let api_port: u16 = Input::with_theme(&theme)
        .with_prompt("  Port for the local JSON API")
        .default(defaults.api_port)
        .interact_text()
        .context("Failed to read API port")?;
    println!("  ✓ API will listen on 127.0.0.1:{api_port}");

    println!("\n[2/4] Report output directory");
    let report_dir_input: String = Input::with_theme(&theme)
        .with_prompt("  Folder where progress reports will be saved")
        .default(default_report_dir().display().to_string())
        .interact_text()
        .context("Failed to read report directory")?;
    let report_dir = expand_home(&report_dir_input);
    println!("  ✓ {}", report_dir.display());

    println!("\n[3/4] Default plan size");
    let default_total_days: u32 = Input::with_theme(&theme)
        .with_prompt("  Days in a new learning plan")
        .default(defaults.default_total_days)
        .validate_with(|input: &u32| -> std::result::Result<(), String> {
            validate_total_days(*input).map_err(|error| error.to_string())
        })
        .interact_text()
        .context("Failed to read default plan size")?;
    let default_daily_hours: f64 = Input::with_theme(&theme)
        .with_prompt("  Study hours per day")
        .default(defaults.default_daily_hours)
        .validate_with(|input: &f64| -> std::result::Result<(), String> {
            validate_daily_hours(*input).map_err(|error| error.to_string())
        })
        .interact_text()
        .context("Failed to read daily hours")?;
    println!("  ✓ {default_total_days} days, {default_daily_hours}h per day");

    let config = Config {
        api_port,
        report_dir,
        default_total_days,
        default_daily_hours,
        ..defaults
    };

    config.ensure_bootstrap_files()?;
    config.save()?;
    let database = Database::open(&config.db_path)?;

    println!("\n[4/4] First tracker");
    let create_tracker = Confirm::with_theme(&theme)
        .with_prompt("  Create a tracker now?")
        .default(true)
        .interact()
        .context("Failed to read tracker confirmation")?;

    if create_tracker {
        let slug: String = Input::with_theme(&theme)
            .with_prompt("  Tracker slug (lowercase, digits, hyphens)")
            .validate_with(|input: &String| -> std::result::Result<(), String> {
                validate_slug(input).map_err(|error| error.to_string())
            })
            .interact_text()
            .context("Failed to read tracker slug")?;
        let title: String = Input::with_theme(&theme)
            .with_prompt("  Tracker title")
            .default(slug.clone())
            .interact_text()
            .context("Failed to read tracker title")?;

        let created = database.create_tracker(&NewTracker {
            slug: slug.clone(),
            title,
            description: String::new(),
            start_date: Some(chrono::Local::now().date_naive()),
            total_days: config.default_total_days,
            daily_hours: config.default_daily_hours,
        })?;

        if created {
            println!("  ✓ Tracker created: {slug}");
        } else {
            println!("  ! Tracker {slug} already exists, kept as is");
        }
    } else {
        println!("  ✓ Skipped tracker creation");
    }

    println!("\n──────────────────────────────────────────");
    println!("  Onboarding complete!");
    println!("  Import a plan with: StudyTracker import <slug> <plan.md>");
    println!("  Start the API with: StudyTracker serve");
    println!("──────────────────────────────────────────");

    Ok(config)
}
