//! Decides whether the cached observation may be served.

use chrono::{DateTime, Duration, Utc};

use crate::cache::CacheRecord;

/// Outcome of comparing a cached record against the current configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    /// No usable timestamp: a new record, or one whose date did not parse.
    NeverPopulated,
    Expired { age: Duration },
    /// The configured city differs from the one the cache was filled for.
    CityChanged { cached: String },
}

impl Freshness {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Freshness::Fresh)
    }
}

/// Decide whether `cache` may be served for `city` at `now`.
///
/// Both conditions must hold: the record is younger than `interval_min`
/// minutes and it was populated for the same city. A timestamp ahead of
/// `now` has a negative age and so counts as young.
pub fn evaluate(
    cache: &CacheRecord,
    city: &str,
    now: DateTime<Utc>,
    interval_min: u32,
) -> Freshness {
    let Some(stamped) = cache.date else {
        return Freshness::NeverPopulated;
    };

    let age = now - stamped;
    if age >= Duration::minutes(i64::from(interval_min)) {
        return Freshness::Expired { age };
    }
    if cache.city != city {
        return Freshness::CityChanged {
            cached: cache.city.clone(),
        };
    }

    Freshness::Fresh
}

pub fn is_valid(cache: &CacheRecord, city: &str, now: DateTime<Utc>, interval_min: u32) -> bool {
    evaluate(cache, city, now, interval_min).is_fresh()
}
