use crate::{
    config::Settings,
    error::Result,
    model::{Conditions, GeoPosition},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// The two-stage remote lookup: city name to coordinates, then coordinates
/// to current conditions. Each call is a single attempt.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn geocode(&self, city: &str, api_key: &str) -> Result<GeoPosition>;

    async fn current_weather(&self, position: GeoPosition, api_key: &str) -> Result<Conditions>;
}

/// Construct the production provider, honouring the configured timeout.
pub fn provider_from_settings(settings: &Settings) -> Result<OpenWeatherClient> {
    OpenWeatherClient::new(settings.timeout)
}
