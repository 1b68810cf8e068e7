use std::path::PathBuf;

use thiserror::Error;

/// A required configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    ApiKey,
    City,
    TempUnit,
    Interval,
}

impl ConfigField {
    /// Human-readable name used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            ConfigField::ApiKey => "api key",
            ConfigField::City => "city",
            ConfigField::TempUnit => "temp unit",
            ConfigField::Interval => "interval for API requests",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing {} in config", .0.describe())]
    Missing(ConfigField),

    #[error("Incomplete config setup: {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Every way a single invocation can fail.
///
/// The variants mirror the failure classes a caller can tell apart by
/// exit status; see [`WeatherError::exit_code`].
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("API request failed: {0}")]
    Api(String),

    #[error("temp unit not recognized ('{0}'). The following are supported: celsius, fahrenheit and kelvin")]
    UnknownUnit(String),

    #[error("Issues retrieving correct icon identifier: '{0}'")]
    UnknownIcon(String),

    #[error("Failed to access {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WeatherError {
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WeatherError::Storage { path: path.into(), source }
    }

    pub fn missing(field: ConfigField) -> Self {
        WeatherError::Config(ConfigError::Missing(field))
    }

    /// Process exit status for this failure class.
    pub fn exit_code(&self) -> u8 {
        match self {
            WeatherError::Config(_) => 2,
            WeatherError::Api(_) => 3,
            WeatherError::UnknownUnit(_) => 4,
            WeatherError::UnknownIcon(_) => 5,
            WeatherError::Storage { .. } => 6,
        }
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
