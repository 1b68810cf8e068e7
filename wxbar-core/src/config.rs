use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

use crate::{
    error::{ConfigError, ConfigField, Result, WeatherError},
    units::TempUnit,
};

pub const DEFAULT_INTERVAL_MIN: u32 = 15;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration as stored on disk. Every field may be absent; completeness
/// is checked by [`ConfigFile::validate`].
///
/// Example:
/// {
///   "api_key": "...",
///   "city": "Paris",
///   "temp_unit": "celsius",
///   "interval_min": 15
/// }
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub temp_unit: Option<String>,
    #[serde(default)]
    pub interval_min: Option<u32>,

    /// Per-request HTTP timeout; defaults to [`DEFAULT_TIMEOUT_SECS`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// The placeholder written on first run: all strings empty.
    pub fn template() -> Self {
        Self {
            api_key: Some(String::new()),
            city: Some(String::new()),
            temp_unit: Some(String::new()),
            interval_min: Some(DEFAULT_INTERVAL_MIN),
            timeout_secs: None,
        }
    }

    /// Check that every required field is present and usable.
    ///
    /// Fields are checked in a fixed order (api key, city, unit, interval)
    /// so the first missing one is the one reported.
    pub fn validate(&self) -> Result<Settings> {
        let api_key = required(&self.api_key, ConfigField::ApiKey)?;
        let city = required(&self.city, ConfigField::City)?;
        let unit = required(&self.temp_unit, ConfigField::TempUnit)?;
        let interval_min = self
            .interval_min
            .ok_or_else(|| WeatherError::missing(ConfigField::Interval))?;

        Ok(Settings {
            api_key: api_key.to_string(),
            city: city.to_string(),
            temp_unit: TempUnit::try_from(unit)?,
            interval_min,
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }
}

fn required(value: &Option<String>, field: ConfigField) -> Result<&str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(WeatherError::missing(field)),
    }
}

/// Validated configuration the rest of the crate works with.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_key: String,
    pub city: String,
    pub temp_unit: TempUnit,
    pub interval_min: u32,
    pub timeout: Duration,
}

/// Reads the configuration file, creating a placeholder on first run.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load config from disk. A missing file is replaced by the template
    /// first, so a fresh install reads back empty fields instead of failing.
    pub fn load(&self) -> Result<ConfigFile> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "config file missing, writing template");
            self.save(&ConfigFile::template())?;
        }

        let contents =
            fs::read_to_string(&self.path).map_err(|e| WeatherError::storage(&self.path, e))?;

        let cfg: ConfigFile = serde_json::from_str(&contents).map_err(|source| {
            ConfigError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self, config: &ConfigFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| WeatherError::storage(parent, e))?;
        }

        let json = serde_json::to_string_pretty(config).map_err(|source| {
            ConfigError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;

        fs::write(&self.path, json + "\n").map_err(|e| WeatherError::storage(&self.path, e))?;

        Ok(())
    }
}
