//! Serve the cached observation or refresh it, and pick the line to print.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::{
    cache::{CacheRecord, CacheStore},
    config::{ConfigStore, Settings},
    error::Result,
    freshness::{self, Freshness},
    icon,
    model::OutputMode,
    provider::WeatherProvider,
};

#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: ConfigStore,
    cache: CacheStore,
}

impl Orchestrator {
    pub fn new(config: ConfigStore, cache: CacheStore) -> Self {
        Self { config, cache }
    }

    /// Load and validate the configuration.
    pub fn settings(&self) -> Result<Settings> {
        self.config.load()?.validate()
    }

    /// One invocation: returns the line to print.
    ///
    /// `make_provider` is only called on a cache miss, so a fresh cache never
    /// touches the network stack.
    pub async fn run<P, F>(&self, mode: OutputMode, now: DateTime<Utc>, make_provider: F) -> Result<String>
    where
        P: WeatherProvider,
        F: FnOnce(&Settings) -> Result<P>,
    {
        let settings = self.settings()?;
        let cached = self.cache.load()?;

        match freshness::evaluate(&cached, &settings.city, now, settings.interval_min) {
            Freshness::Fresh => {
                debug!(city = %settings.city, "serving cached observation");
                return Ok(select(&cached, mode));
            }
            stale => debug!(reason = ?stale, "cache not usable, refreshing"),
        }

        // Stamp before going to the network: if the process dies mid-refresh
        // the next run still waits out the interval.
        self.cache.update(|r| r.date = Some(now))?;

        let refreshed = match make_provider(&settings) {
            Ok(provider) => refresh(&provider, &settings, now).await,
            Err(e) => Err(e),
        };

        match refreshed {
            Ok(record) => {
                self.cache.persist(&record)?;
                info!(city = %record.city, temp = %record.temp, "cache refreshed");
                Ok(select(&record, mode))
            }
            Err(e) => {
                // Put the previous record back so the next run retries.
                if let Err(rollback) = self.cache.persist(&cached) {
                    warn!(error = %rollback, "failed to roll back cache timestamp");
                }
                Err(e)
            }
        }
    }
}

async fn refresh<P: WeatherProvider>(
    provider: &P,
    settings: &Settings,
    now: DateTime<Utc>,
) -> Result<CacheRecord> {
    let position = provider.geocode(&settings.city, &settings.api_key).await?;
    let conditions = provider.current_weather(position, &settings.api_key).await?;

    let temp = settings.temp_unit.format(conditions.temperature_kelvin);
    let glyph = icon::glyph_for(&conditions.icon_code)?;

    Ok(CacheRecord {
        date: Some(now),
        city: settings.city.clone(),
        icon: glyph.to_string(),
        temp,
    })
}

fn select(record: &CacheRecord, mode: OutputMode) -> String {
    match mode {
        OutputMode::Temperature => record.temp.clone(),
        OutputMode::Icon => record.icon.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ConfigFile,
        error::{ConfigError, ConfigField, WeatherError},
        model::{Conditions, GeoPosition},
    };
    use async_trait::async_trait;
    use chrono::Duration;
    use std::{
        path::PathBuf,
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };
    use tempfile::TempDir;

    #[derive(Debug, Default)]
    struct Calls {
        geocode: AtomicUsize,
        weather: AtomicUsize,
        cities: Mutex<Vec<String>>,
        date_seen_during_geocode: Mutex<Option<Option<DateTime<Utc>>>>,
    }

    #[derive(Debug, Clone)]
    struct FakeProvider {
        calls: Arc<Calls>,
        cache_path: PathBuf,
        icon_code: String,
        fail_weather: bool,
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn geocode(&self, city: &str, api_key: &str) -> Result<GeoPosition> {
            assert_eq!(api_key, "k");
            self.calls.geocode.fetch_add(1, Ordering::SeqCst);
            self.calls.cities.lock().unwrap().push(city.to_string());
            let on_disk = CacheStore::new(&self.cache_path).load().unwrap();
            *self.calls.date_seen_during_geocode.lock().unwrap() = Some(on_disk.date);
            Ok(GeoPosition { lat: 48.85, lon: 2.35 })
        }

        async fn current_weather(&self, position: GeoPosition, _api_key: &str) -> Result<Conditions> {
            assert_eq!(position.lat, 48.85);
            self.calls.weather.fetch_add(1, Ordering::SeqCst);
            if self.fail_weather {
                return Err(WeatherError::Api("status 500".into()));
            }
            Ok(Conditions {
                temperature_kelvin: 273.15 + 18.6,
                icon_code: self.icon_code.clone(),
            })
        }
    }

    struct Fixture {
        _dir: TempDir,
        config: ConfigStore,
        cache: CacheStore,
        calls: Arc<Calls>,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().expect("Failed to create temp directory");
            let config = ConfigStore::new(dir.path().join(".config/.weather_config.json"));
            let cache = CacheStore::new(dir.path().join(".config/weather_cache.json"));
            Self {
                _dir: dir,
                config,
                cache,
                calls: Arc::default(),
            }
        }

        fn with_config(self, city: &str) -> Self {
            self.config
                .save(&ConfigFile {
                    api_key: Some("k".into()),
                    city: Some(city.into()),
                    temp_unit: Some("celsius".into()),
                    interval_min: Some(15),
                    timeout_secs: None,
                })
                .unwrap();
            self
        }

        fn provider(&self) -> FakeProvider {
            FakeProvider {
                calls: self.calls.clone(),
                cache_path: self.cache.path().to_path_buf(),
                icon_code: "02d".into(),
                fail_weather: false,
            }
        }

        fn orchestrator(&self) -> Orchestrator {
            Orchestrator::new(self.config.clone(), self.cache.clone())
        }

        async fn run_with(&self, provider: FakeProvider, mode: OutputMode) -> Result<String> {
            self.orchestrator().run(mode, now(), move |_| Ok(provider)).await
        }

        fn network_calls(&self) -> usize {
            self.calls.geocode.load(Ordering::SeqCst) + self.calls.weather.load(Ordering::SeqCst)
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn record(city: &str, minutes_ago: i64) -> CacheRecord {
        CacheRecord {
            date: Some(now() - Duration::minutes(minutes_ago)),
            city: city.into(),
            icon: "\u{e33d}".into(),
            temp: "7°".into(),
        }
    }

    #[tokio::test]
    async fn first_run_reports_missing_api_key_without_network() {
        let fx = Fixture::new();

        let err = fx.run_with(fx.provider(), OutputMode::Temperature).await.unwrap_err();

        assert!(matches!(
            err,
            WeatherError::Config(ConfigError::Missing(ConfigField::ApiKey))
        ));
        assert_eq!(err.to_string(), "Missing api key in config");
        assert_eq!(fx.network_calls(), 0);
        assert!(fx.config.path().exists());
    }

    #[tokio::test]
    async fn empty_cache_triggers_full_refresh() {
        let fx = Fixture::new().with_config("Paris");

        let out = fx.run_with(fx.provider(), OutputMode::Temperature).await.unwrap();

        assert_eq!(out, "18°");
        assert_eq!(fx.calls.geocode.load(Ordering::SeqCst), 1);
        assert_eq!(fx.calls.weather.load(Ordering::SeqCst), 1);
        assert_eq!(*fx.calls.cities.lock().unwrap(), vec!["Paris".to_string()]);

        let stored = fx.cache.load().unwrap();
        assert_eq!(stored.city, "Paris");
        assert_eq!(stored.temp, "18°");
        assert_eq!(stored.icon, "\u{e302}");
        assert_eq!(stored.date, Some(now()));
    }

    #[tokio::test]
    async fn date_is_stamped_before_the_network_call() {
        let fx = Fixture::new().with_config("Paris");

        fx.run_with(fx.provider(), OutputMode::Icon).await.unwrap();

        let seen = *fx.calls.date_seen_during_geocode.lock().unwrap();
        assert_eq!(seen, Some(Some(now())));
    }

    #[tokio::test]
    async fn fresh_cache_is_served_without_network() {
        let fx = Fixture::new().with_config("Paris");
        fx.cache.persist(&record("Paris", 5)).unwrap();

        let temp = fx.run_with(fx.provider(), OutputMode::Temperature).await.unwrap();
        let icon = fx.run_with(fx.provider(), OutputMode::Icon).await.unwrap();

        assert_eq!(temp, "7°");
        assert_eq!(icon, "\u{e33d}");
        assert_eq!(fx.network_calls(), 0);
    }

    #[tokio::test]
    async fn fresh_cache_never_builds_a_provider() {
        let fx = Fixture::new().with_config("Paris");
        fx.cache.persist(&record("Paris", 1)).unwrap();

        let out = fx
            .orchestrator()
            .run(OutputMode::Temperature, now(), |_| -> Result<FakeProvider> {
                panic!("provider must not be built for a fresh cache")
            })
            .await
            .unwrap();

        assert_eq!(out, "7°");
    }

    #[tokio::test]
    async fn changed_city_forces_refresh() {
        let fx = Fixture::new().with_config("Paris");
        fx.cache.persist(&record("London", 1)).unwrap();

        fx.run_with(fx.provider(), OutputMode::Temperature).await.unwrap();

        assert_eq!(fx.calls.geocode.load(Ordering::SeqCst), 1);
        assert_eq!(fx.cache.load().unwrap().city, "Paris");
    }

    #[tokio::test]
    async fn expired_cache_forces_refresh() {
        let fx = Fixture::new().with_config("Paris");
        fx.cache.persist(&record("Paris", 16)).unwrap();

        let out = fx.run_with(fx.provider(), OutputMode::Icon).await.unwrap();

        assert_eq!(out, "\u{e302}");
        assert_eq!(fx.network_calls(), 2);
    }

    #[tokio::test]
    async fn api_failure_rolls_back_the_stamp() {
        let fx = Fixture::new().with_config("Paris");
        let previous = record("Paris", 60);
        fx.cache.persist(&previous).unwrap();

        let mut provider = fx.provider();
        provider.fail_weather = true;
        let err = fx.run_with(provider, OutputMode::Temperature).await.unwrap_err();

        assert_eq!(err.exit_code(), 3);
        assert_eq!(fx.cache.load().unwrap(), previous);
    }

    #[tokio::test]
    async fn unknown_icon_fails_without_partial_update() {
        let fx = Fixture::new().with_config("Paris");

        let mut provider = fx.provider();
        provider.icon_code = "99x".into();
        let err = fx.run_with(provider, OutputMode::Temperature).await.unwrap_err();

        assert!(matches!(err, WeatherError::UnknownIcon(ref c) if c == "99x"));
        assert!(fx.cache.load().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_icon_restores_previous_record() {
        let fx = Fixture::new().with_config("Paris");
        let previous = record("Paris", 60);
        fx.cache.persist(&previous).unwrap();

        let mut provider = fx.provider();
        provider.icon_code = "99x".into();
        let err = fx.run_with(provider, OutputMode::Icon).await.unwrap_err();

        assert_eq!(err.exit_code(), 5);
        assert_eq!(fx.network_calls(), 2);
        // the pre-refresh stamp was on disk while the request ran
        assert_eq!(*fx.calls.date_seen_during_geocode.lock().unwrap(), Some(Some(now())));
        assert_eq!(fx.cache.load().unwrap(), previous);
    }

    #[tokio::test]
    async fn unknown_unit_is_reported_before_any_request() {
        let fx = Fixture::new();
        fx.config
            .save(&ConfigFile {
                api_key: Some("k".into()),
                city: Some("Paris".into()),
                temp_unit: Some("rankine".into()),
                interval_min: Some(15),
                timeout_secs: None,
            })
            .unwrap();

        let err = fx.run_with(fx.provider(), OutputMode::Temperature).await.unwrap_err();

        assert!(matches!(err, WeatherError::UnknownUnit(_)));
        assert_eq!(fx.network_calls(), 0);
    }
}
