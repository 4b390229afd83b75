//! Service configuration.
//!
//! Settings come from an optional TOML file, then environment variables
//! (after `.env` is loaded) override individual keys. Every setting has a
//! default, so an absent file is not an error.
//!
//! ```toml
//! bind_addr = "127.0.0.1:8000"
//! fetch_timeout_secs = 10
//! log_level = "debug"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::chart::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::ingest::fred::FRED_BASE_URL;
use crate::model::NATIONAL_SERIES_ID;

/// Config file read when neither `--config` nor `VIZ_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "./viz.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value '{value}' for {key}")]
    InvalidOverride { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub bind_addr: String,
    pub fred_base_url: String,
    pub national_series_id: String,
    pub fetch_timeout_secs: u64,
    pub chart_width: u32,
    pub chart_height: u32,
    /// Pins the current year (the comparison year is five before it). Normally
    /// unset, meaning the wall clock.
    pub current_year: Option<i32>,
    pub log_level: String,
    pub log_file: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            fred_base_url: FRED_BASE_URL.to_string(),
            national_series_id: NATIONAL_SERIES_ID.to_string(),
            fetch_timeout_secs: 30,
            chart_width: DEFAULT_WIDTH,
            chart_height: DEFAULT_HEIGHT,
            current_year: None,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl ServiceConfig {
    /// Load from `path` (or `VIZ_CONFIG`, or [`DEFAULT_CONFIG_PATH`]) and
    /// apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let path = match path {
            Some(p) => p.to_path_buf(),
            None => std::env::var("VIZ_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH)),
        };

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Apply `VIZ_*` overrides. `lookup` returns the raw value for a key,
    /// if set; tests pass a map instead of touching the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("VIZ_BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = lookup("VIZ_FRED_BASE_URL") {
            self.fred_base_url = v;
        }
        if let Some(v) = lookup("VIZ_NATIONAL_SERIES") {
            self.national_series_id = v;
        }
        if let Some(v) = lookup("VIZ_FETCH_TIMEOUT_SECS") {
            self.fetch_timeout_secs = parse_override("VIZ_FETCH_TIMEOUT_SECS", v)?;
        }
        if let Some(v) = lookup("VIZ_CURRENT_YEAR") {
            self.current_year = Some(parse_override("VIZ_CURRENT_YEAR", v)?);
        }
        if let Some(v) = lookup("VIZ_LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = lookup("VIZ_LOG_FILE") {
            self.log_file = Some(v);
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn parse_override<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidOverride { key, value })
}
