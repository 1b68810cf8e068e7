//! On-disk record of the last successful lookup.
//!
//! The file is a flat JSON object:
//!
//! ```json
//! { "date": "1718000000", "city": "Paris", "icon": "...", "temp": "21°" }
//! ```
//!
//! `date` is epoch seconds in text form, empty until the first refresh.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::error::{Result, WeatherError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// When the last refresh started. `None` for a record that was never
    /// populated or whose timestamp could not be read.
    #[serde(default, with = "epoch_text")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub temp: String,
}

impl CacheRecord {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.city.is_empty() && self.icon.is_empty() && self.temp.is_empty()
    }
}

mod epoch_text {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};
    use tracing::warn;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Seconds(i64),
    }

    pub fn serialize<S: Serializer>(date: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.timestamp().to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        let seconds = match Option::<Raw>::deserialize(d)? {
            None => return Ok(None),
            Some(Raw::Seconds(n)) => n,
            Some(Raw::Text(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(None);
                }
                match text.parse::<i64>() {
                    Ok(n) => n,
                    Err(_) => {
                        warn!(date = text, "unreadable cache timestamp, treating cache as stale");
                        return Ok(None);
                    }
                }
            }
        };

        Ok(DateTime::from_timestamp(seconds, 0))
    }
}

/// Owns the cache file. Writes go through a sibling temp file and a rename,
/// so a concurrent reader never sees a half-written record.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record, creating an empty one on first use.
    ///
    /// A file that is not valid JSON yields an empty record; it gets
    /// replaced on the next [`persist`](Self::persist).
    pub fn load(&self) -> Result<CacheRecord> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no cache file, creating empty record");
            let empty = CacheRecord::default();
            self.persist(&empty)?;
            return Ok(empty);
        }

        let contents =
            fs::read_to_string(&self.path).map_err(|e| WeatherError::storage(&self.path, e))?;

        match serde_json::from_str(&contents) {
            Ok(record) => Ok(record),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt cache file, ignoring it");
                Ok(CacheRecord::default())
            }
        }
    }

    pub fn persist(&self, record: &CacheRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| WeatherError::storage(parent, e))?;
        }

        let json = serde_json::to_string_pretty(record)
            .map_err(|e| WeatherError::storage(&self.path, e.into()))?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, json + "\n").map_err(|e| WeatherError::storage(&temp_path, e))?;
        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            WeatherError::storage(&self.path, e)
        })?;

        Ok(())
    }

    /// Read-modify-write of individual fields; returns the stored record.
    pub fn update<F>(&self, change: F) -> Result<CacheRecord>
    where
        F: FnOnce(&mut CacheRecord),
    {
        let mut record = self.load()?;
        change(&mut record);
        self.persist(&record)?;
        Ok(record)
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cache".to_string());

        self.path
            .with_file_name(format!(".{name}.{}.tmp", std::process::id()))
    }
}
