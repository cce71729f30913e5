use anyhow::{Context, Result};
use classplan_core::gateway::DEFAULT_MAX_POINTS;
use classplan_core::time::DEFAULT_TIMEZONE;
use classplan_core::{DEFAULT_PAGE_SIZE, DEFAULT_SUBMISSION_FOLDER, ExecutorOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_classplan_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schedule: ScheduleSection,
    pub google: GoogleSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSection {
    /// IANA zone that naive plan dates are read in.
    pub timezone: String,
    /// Drive folder assignment submissions land in.
    pub submission_folder: String,
    pub default_max_points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSection {
    pub classroom_base_url: String,
    pub drive_base_url: String,
    /// Listing page size; only the first page is ever read.
    pub page_size: u32,
    /// OAuth client secret ("installed" app), relative to the classplan home.
    pub credentials_file: String,
    pub token_cache_file: String,
}

impl Default for ScheduleSection {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            submission_folder: DEFAULT_SUBMISSION_FOLDER.to_string(),
            default_max_points: DEFAULT_MAX_POINTS,
        }
    }
}

impl Default for GoogleSection {
    fn default() -> Self {
        Self {
            classroom_base_url: "https://classroom.googleapis.com/v1".to_string(),
            drive_base_url: "https://www.googleapis.com/drive/v3".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            credentials_file: "credentials.json".to_string(),
            token_cache_file: "token_cache.json".to_string(),
        }
    }
}

impl Config {
    pub fn executor_options(&self) -> ExecutorOptions {
        ExecutorOptions {
            submission_folder: self.schedule.submission_folder.clone(),
            default_max_points: self.schedule.default_max_points,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_classplan_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
