//! Core library for the `wxbar` status bar command.
//!
//! This crate defines:
//! - Configuration loading and validation
//! - The on-disk cache and the decision whether it may be served
//! - The two-stage OpenWeather lookup behind a provider trait
//! - Unit conversion and the condition-code glyph table
//!
//! [`Orchestrator`] ties these together for one invocation.

pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod freshness;
pub mod icon;
pub mod model;
pub mod paths;
pub mod provider;
pub mod units;

pub use app::Orchestrator;
pub use cache::{CacheRecord, CacheStore};
pub use config::{ConfigFile, ConfigStore, Settings};
pub use error::{ConfigError, ConfigField, WeatherError};
pub use freshness::Freshness;
pub use model::{Conditions, GeoPosition, OutputMode};
pub use paths::Paths;
pub use provider::{WeatherProvider, openweather::OpenWeatherClient};
pub use units::TempUnit;
