use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    error::{Result, WeatherError},
    model::{Conditions, GeoPosition},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

const GEOCODE_PATH: &str = "/geo/1.0/direct";
const WEATHER_PATH: &str = "/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    /// Point the client somewhere other than the public API, e.g. a mock server.
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Api(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        what: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        let res = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| WeatherError::Api(format!("failed to send {what} request: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::Api(format!("failed to read {what} response body: {e}")))?;

        if !status.is_success() {
            return Err(WeatherError::Api(format!(
                "{what} request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| WeatherError::Api(format!("failed to parse {what} JSON: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct OwPlace {
    lat: f64,
    lon: f64,
}

/// The direct-geocoding endpoint returns a flat list of places; some
/// proxies wrap it once more. Either way the first place wins.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OwGeocodeResponse {
    Nested(Vec<Vec<OwPlace>>),
    Flat(Vec<OwPlace>),
}

impl OwGeocodeResponse {
    fn first(self) -> Option<OwPlace> {
        match self {
            OwGeocodeResponse::Nested(groups) => groups.into_iter().next()?.into_iter().next(),
            OwGeocodeResponse::Flat(places) => places.into_iter().next(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[instrument(skip(self, api_key))]
    async fn geocode(&self, city: &str, api_key: &str) -> Result<GeoPosition> {
        let parsed: OwGeocodeResponse = self
            .get_json(
                "geocoding",
                GEOCODE_PATH,
                &[("q", city), ("limit", "1"), ("appid", api_key)],
            )
            .await?;

        let place = parsed
            .first()
            .ok_or_else(|| WeatherError::Api(format!("no geocoding match for '{city}'")))?;

        debug!(lat = place.lat, lon = place.lon, "geocoded");

        Ok(GeoPosition {
            lat: place.lat,
            lon: place.lon,
        })
    }

    #[instrument(skip(self, api_key))]
    async fn current_weather(&self, position: GeoPosition, api_key: &str) -> Result<Conditions> {
        let lat = position.lat.to_string();
        let lon = position.lon.to_string();

        let parsed: OwCurrentResponse = self
            .get_json(
                "current weather",
                WEATHER_PATH,
                &[("lat", lat.as_str()), ("lon", lon.as_str()), ("appid", api_key)],
            )
            .await?;

        let icon_code = parsed
            .weather
            .into_iter()
            .next()
            .map(|w| w.icon)
            .ok_or_else(|| WeatherError::Api("current weather response had no conditions".into()))?;

        debug!(temp = parsed.main.temp, icon = %icon_code, "current weather");

        Ok(Conditions {
            temperature_kelvin: parsed.main.temp,
            icon_code,
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
