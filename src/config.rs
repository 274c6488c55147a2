//! Application configuration.
//!
//! Handles loading, validating, and merging `daily-post.toml`. Stock
//! defaults are the base layer; the user file only needs the keys it wants
//! to override. A missing file means stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! watch_folder = "UPLOADS"          # Folder scanned for new photos
//! ledger = "uploadedFiles.txt"      # One posted filename per line
//! credentials = "login.txt"         # username=... / password=...
//! session_dir = "config"            # Purged before every run
//!
//! [caption]
//! template = "Song of Today: {date}"
//! date_format = "%Y-%m-%d"          # chrono strftime syntax
//!
//! [images]
//! quality = 95                      # JPEG quality for generated files (1-100)
//! min_ratio = 0.8                   # Narrowest width:height accepted (4:5)
//! max_ratio = 1.91                  # Widest width:height accepted (1.91:1)
//!
//! [retry]
//! max_attempts = 3
//! base_delay_ms = 5000              # Doubles after each failed attempt
//! max_jitter_ms = 1000
//!
//! [pacing]
//! pre_login = { min_ms = 2000, max_ms = 4000 }
//! post_login = { min_ms = 3000, max_ms = 5000 }
//! before_logout_ms = 1000
//!
//! [service]
//! base_url = "http://127.0.0.1:8080"
//! timeout_secs = 60
//!
//! [schedule]
//! at = "23:00"                      # Local time of the daily run
//! poll_secs = 60                    # Longest single sleep while waiting
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::caption;
use crate::imaging::{AspectEnvelope, Quality};
use crate::pacing::PacingWindow;
use crate::pipeline::PipelineSettings;
use crate::retry::RetryPolicy;
use crate::session::SessionSettings;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "daily-post.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Application configuration loaded from `daily-post.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub caption: CaptionConfig,
    pub images: ImagesConfig,
    pub retry: RetryConfig,
    pub pacing: PacingConfig,
    pub service: ServiceConfig,
    pub schedule: ScheduleConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.images.quality) {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        let (min, max) = (self.images.min_ratio, self.images.max_ratio);
        if !(min > 0.0 && min < max && max.is_finite()) {
            return Err(ConfigError::Validation(
                "images ratios must satisfy 0 < min_ratio < max_ratio".into(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        for (name, range) in [
            ("pacing.pre_login", &self.pacing.pre_login),
            ("pacing.post_login", &self.pacing.post_login),
        ] {
            if range.min_ms > range.max_ms {
                return Err(ConfigError::Validation(format!(
                    "{name}: min_ms must not exceed max_ms"
                )));
            }
        }
        caption::validate_template(&self.caption.template, &self.caption.date_format)
            .map_err(|e| ConfigError::Validation(format!("caption: {e}")))?;
        self.schedule.time()?;
        if self.schedule.poll_secs == 0 {
            return Err(ConfigError::Validation(
                "schedule.poll_secs must be at least 1".into(),
            ));
        }
        if self.service.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "service.base_url must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.base_delay_ms),
            Duration::from_millis(self.retry.max_jitter_ms),
        )
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            session_dir: self.paths.session_dir.clone(),
            pre_login: self.pacing.pre_login.window(),
            post_login: self.pacing.post_login.window(),
            before_logout: Duration::from_millis(self.pacing.before_logout_ms),
        }
    }

    pub fn envelope(&self) -> AspectEnvelope {
        AspectEnvelope::new(self.images.min_ratio, self.images.max_ratio)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            watch_folder: self.paths.watch_folder.clone(),
            ledger_path: self.paths.ledger.clone(),
            quality: Quality::new(self.images.quality),
            envelope: self.envelope(),
            caption_template: self.caption.template.clone(),
            date_format: self.caption.date_format.clone(),
            retry: self.retry_policy(),
            session: self.session_settings(),
        }
    }
}

/// File locations, relative to the working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub watch_folder: PathBuf,
    pub ledger: PathBuf,
    pub credentials: PathBuf,
    pub session_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            watch_folder: PathBuf::from("UPLOADS"),
            ledger: PathBuf::from("uploadedFiles.txt"),
            credentials: PathBuf::from("login.txt"),
            session_dir: PathBuf::from("config"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptionConfig {
    pub template: String,
    pub date_format: String,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            template: "Song of Today: {date}".to_string(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

/// Normalization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    pub quality: u32,
    pub min_ratio: f64,
    pub max_ratio: f64,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        let envelope = AspectEnvelope::default();
        Self {
            quality: Quality::default().value(),
            min_ratio: envelope.min_ratio,
            max_ratio: envelope.max_ratio,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 5000,
            max_jitter_ms: 1000,
        }
    }
}

/// Bounds of a randomized pause, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PauseRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl PauseRange {
    pub fn window(&self) -> PacingWindow {
        PacingWindow::new(
            Duration::from_millis(self.min_ms),
            Duration::from_millis(self.max_ms),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PacingConfig {
    pub pre_login: PauseRange,
    pub post_login: PauseRange,
    pub before_logout_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            pre_login: PauseRange {
                min_ms: 2000,
                max_ms: 4000,
            },
            post_login: PauseRange {
                min_ms: 3000,
                max_ms: 5000,
            },
            before_logout_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_secs: 60,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Local wall-clock time, `HH:MM`.
    pub at: String,
    pub poll_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            at: "23:00".to_string(),
            poll_secs: 60,
        }
    }
}

impl ScheduleConfig {
    /// Parse `at` into a time of day.
    pub fn time(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::parse_from_str(self.at.trim(), "%H:%M").map_err(|_| {
            ConfigError::Validation(format!("schedule.at must be HH:MM, got '{}'", self.at))
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_secs)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AppConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults if absent.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    let config = resolve_config(base, overlay)?;
    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Returns a fully-commented stock `daily-post.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# daily-post configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Relative paths are resolved against
# the working directory. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Paths
# ---------------------------------------------------------------------------
[paths]
# Folder scanned for new photos (top level only). Created if missing.
watch_folder = "UPLOADS"
# Append-only list of posted filenames, one per line.
ledger = "uploadedFiles.txt"
# Credentials file with `username=...` and `password=...` lines.
credentials = "login.txt"
# Session/cache directory. Deleted before every run.
session_dir = "config"

# ---------------------------------------------------------------------------
# Caption
# ---------------------------------------------------------------------------
[caption]
# {date} is replaced by the local date of the run.
template = "Song of Today: {date}"
# chrono strftime format for {date}.
date_format = "%Y-%m-%d"

# ---------------------------------------------------------------------------
# Image normalization
# ---------------------------------------------------------------------------
[images]
# JPEG quality for converted and cropped files (1-100).
quality = 95
# Accepted width:height range. Images outside it are center-cropped.
# 0.8 is portrait 4:5, 1.91 is landscape 1.91:1.
min_ratio = 0.8
max_ratio = 1.91

# ---------------------------------------------------------------------------
# Upload retries
# ---------------------------------------------------------------------------
[retry]
# Total upload attempts per run, including the first.
max_attempts = 3
# Wait after the first failure; doubles after each further failure.
base_delay_ms = 5000
# Random extra wait added to every retry delay (0 to this value).
max_jitter_ms = 1000

# ---------------------------------------------------------------------------
# Pacing
# ---------------------------------------------------------------------------
[pacing]
# Random pause before logging in.
pre_login = { min_ms = 2000, max_ms = 4000 }
# Random pause after logging in, before the first upload.
post_login = { min_ms = 3000, max_ms = 5000 }
# Pause before logging out.
before_logout_ms = 1000

# ---------------------------------------------------------------------------
# Posting service
# ---------------------------------------------------------------------------
[service]
base_url = "http://127.0.0.1:8080"
# Per-request timeout in seconds.
timeout_secs = 60

# ---------------------------------------------------------------------------
# Daily schedule (daemon mode)
# ---------------------------------------------------------------------------
[schedule]
# Local time of the daily run, HH:MM.
at = "23:00"
# Longest single sleep while waiting for the next run, in seconds.
poll_secs = 60
"##
}
