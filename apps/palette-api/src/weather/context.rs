//! Weather context — cached current conditions plus hemisphere-aware season.
//!
//! Cache entries are keyed by rounded coordinates and expire lazily: a stale entry is
//! simply ignored on read and replaced by the next successful fetch. Failed fetches are
//! never cached, so the next call retries the provider.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Datelike, Duration, Utc};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::weather::models::CacheKey;
use crate::weather::{
    ConfiguredLocation, Coordinates, LocationProvider, OpenWeatherClient, Season,
    WeatherAttributes, WeatherError, WeatherProvider,
};

/// Conditions younger than this are served from the cache.
pub const CACHE_TTL_MINUTES: i64 = 30;
const MAX_CACHE_ENTRIES: usize = 256;

struct CachedConditions {
    attributes: WeatherAttributes,
    fetched_at: DateTime<Utc>,
}

pub struct WeatherContext {
    provider: Arc<dyn WeatherProvider>,
    location: Arc<dyn LocationProvider>,
    clock: Arc<dyn Clock>,
    cache: Mutex<HashMap<CacheKey, CachedConditions>>,
    ttl: Duration,
}

impl WeatherContext {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        location: Arc<dyn LocationProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            location,
            clock,
            cache: Mutex::new(HashMap::new()),
            ttl: Duration::minutes(CACHE_TTL_MINUTES),
        }
    }

    /// Wires the OpenWeather client and configured location. Fails when the key is
    /// absent or blank, or the HTTP client cannot be built.
    pub fn from_credential(
        api_key: Option<&str>,
        base_url: &str,
        location: Option<Coordinates>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, WeatherError> {
        let api_key = api_key.ok_or(WeatherError::MissingCredential)?;
        let client = OpenWeatherClient::new(api_key, base_url)?;
        info!("Weather client initialized ({base_url})");
        Ok(Self::new(
            Arc::new(client),
            Arc::new(ConfiguredLocation::new(location)),
            clock,
        ))
    }

    pub async fn resolve_location(&self) -> Result<Coordinates, WeatherError> {
        self.location.resolve_location().await
    }

    /// Current conditions at `coords`. Never fails: provider errors of any kind yield
    /// `WeatherAttributes::fallback`.
    pub async fn fetch_current_conditions(&self, coords: Coordinates) -> WeatherAttributes {
        let key = coords.cache_key();

        if let Some(hit) = self.cached(key, self.clock.now_utc()) {
            debug!("Using cached weather for ({}, {})", coords.lat, coords.lon);
            return hit;
        }

        match self.provider.fetch(coords).await {
            Ok(attributes) => {
                self.store(key, attributes.clone(), self.clock.now_utc());
                attributes
            }
            Err(e) => {
                warn!("Weather lookup failed, using default conditions: {e}");
                WeatherAttributes::fallback(self.clock.now_utc())
            }
        }
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<CacheKey, CachedConditions>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cached(&self, key: CacheKey, now: DateTime<Utc>) -> Option<WeatherAttributes> {
        self.lock_cache()
            .get(&key)
            .filter(|entry| now - entry.fetched_at < self.ttl)
            .map(|entry| entry.attributes.clone())
    }

    fn store(&self, key: CacheKey, attributes: WeatherAttributes, now: DateTime<Utc>) {
        let mut cache = self.lock_cache();

        if cache.len() >= MAX_CACHE_ENTRIES && !cache.contains_key(&key) {
            let ttl = self.ttl;
            cache.retain(|_, entry| now - entry.fetched_at < ttl);

            if cache.len() >= MAX_CACHE_ENTRIES {
                let oldest = cache
                    .iter()
                    .min_by_key(|(_, entry)| entry.fetched_at)
                    .map(|(k, _)| *k);
                if let Some(oldest) = oldest {
                    cache.remove(&oldest);
                }
            }
        }

        cache.insert(
            key,
            CachedConditions {
                attributes,
                fetched_at: now,
            },
        );
    }

    #[cfg(test)]
    fn cache_len(&self) -> usize {
        self.lock_cache().len()
    }
}

/// Season from the (zero-based) month and hemisphere. Latitude exactly 0 counts as
/// southern.
pub fn season_for(latitude: f64, now: impl Datelike) -> Season {
    let month = now.month0();
    let northern = latitude > 0.0;

    match (month, northern) {
        (2..=4, true) => Season::Spring,
        (5..=7, true) => Season::Summer,
        (8..=10, true) => Season::Fall,
        (_, true) => Season::Winter,
        (2..=4, false) => Season::Fall,
        (5..=7, false) => Season::Winter,
        (8..=10, false) => Season::Spring,
        (_, false) => Season::Summer,
    }
}
