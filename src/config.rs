use crate::tracker::{validate_daily_hours, validate_total_days};
use anyhow::{Context, Result, anyhow, bail};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const APP_DIR: &str = ".StudyTracker";
const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_API_PORT: u16 = 7891;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_port: u16,
    pub db_path: PathBuf,
    pub report_dir: PathBuf,
    pub default_total_days: u32,
    pub default_daily_hours: f64,
}

impl Default for Config {
    fn default() -> Self {
        let root = default_root_dir();

        Self {
            api_port: DEFAULT_API_PORT,
            db_path: root.join("db").join("tracker.db"),
            report_dir: default_report_dir(),
            default_total_days: 100,
            default_daily_hours: 2.0,
        }
    }
}

impl Config {
    pub fn root_dir() -> Result<PathBuf> {
        Ok(default_root_dir())
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(default_root_dir().join(CONFIG_FILE))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;
        set_mode_600(config_path)?;

        Ok(())
    }

    pub fn ensure_bootstrap_files(&self) -> Result<()> {
        let root = Self::root_dir()?;
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create root directory: {}", root.display()))?;

        if let Some(parent) = self.db_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create DB directory: {}", parent.display()))?;
        }

        fs::create_dir_all(&self.report_dir).with_context(|| {
            format!(
                "Failed to create report directory: {}",
                self.report_dir.display()
            )
        })?;

        Ok(())
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match normalize_config_key(key) {
            "api_port" => {
                self.api_port = value
                    .trim()
                    .parse::<u16>()
                    .map_err(|_| anyhow!("api_port must be a number"))?;
            }
            "db_path" => {
                self.db_path = expand_home(value.trim());
            }
            "report_dir" => {
                self.report_dir = expand_home(value.trim());
            }
            "default_total_days" => {
                let parsed = value
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| anyhow!("default_total_days must be a number"))?;
                validate_total_days(parsed)?;
                self.default_total_days = parsed;
            }
            "default_daily_hours" => {
                let parsed = value
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| anyhow!("default_daily_hours must be a number"))?;
                validate_daily_hours(parsed)?;
                self.default_daily_hours = parsed;
            }
            _ => {
                bail!(
                    "Unsupported config key: {key}. Supported keys: api_port|api.port, db_path|db.path, report_dir|report.dir, default_total_days|tracker.total_days, default_daily_hours|tracker.daily_hours"
                );
            }
        }

        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Option<String> {
        match normalize_config_key(key) {
            "api_port" => Some(self.api_port.to_string()),
            "db_path" => Some(self.db_path.display().to_string()),
            "report_dir" => Some(self.report_dir.display().to_string()),
            "default_total_days" => Some(self.default_total_days.to_string()),
            "default_daily_hours" => Some(self.default_daily_hours.to_string()),
            _ => None,
        }
    }
}

fn normalize_config_key(key: &str) -> &str {
    match key {
        "api_port" | "api.port" => "api_port",
        "db_path" | "db.path" => "db_path",
        "report_dir" | "report.dir" => "report_dir",
        "default_total_days" | "tracker.total_days" => "default_total_days",
        "default_daily_hours" | "tracker.daily_hours" => "default_daily_hours",
        _ => key,
    }
}

pub fn expand_home(raw: &str) -> PathBuf {
    raw.strip_prefix("~/")
        .and_then(|stripped| home_dir().map(|home| home.join(stripped)))
        .unwrap_or_else(|| PathBuf::from(raw))
}

pub fn default_report_dir() -> PathBuf {
    default_root_dir().join("reports")
}

fn default_root_dir() -> PathBuf {
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn set_mode_600(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to set file permissions: {}", path.display()))?;
    }

    Ok(())
}
