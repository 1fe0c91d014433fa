//! Weather data models: normalized conditions consumed by the palette generator, and the
//! raw OpenWeather response shape they are parsed from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::weather::WeatherError;

/// Coordinates are rounded to this many decimal places (~1 km) for cache keys.
const CACHE_KEY_PRECISION: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Rounded coordinates; nearby positions share cached conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    lat: i64,
    lon: i64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey {
            lat: (self.lat * CACHE_KEY_PRECISION).round() as i64,
            lon: (self.lon * CACHE_KEY_PRECISION).round() as i64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Clear,
    Rain,
    Drizzle,
    Snow,
    Thunderstorm,
    Other,
}

impl WeatherCondition {
    /// Maps the provider's `weather[0].main` label ("Clear", "Rain", ...), case-insensitively.
    pub fn from_provider_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "clear" => Self::Clear,
            "rain" => Self::Rain,
            "drizzle" => Self::Drizzle,
            "snow" => Self::Snow,
            "thunderstorm" => Self::Thunderstorm,
            _ => Self::Other,
        }
    }
}

/// Current conditions, in the units the palette rules are written for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAttributes {
    pub condition: WeatherCondition,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Cloud cover percentage, 0–100.
    pub cloudiness: f64,
    pub observed_at: DateTime<Utc>,
}

impl WeatherAttributes {
    /// Clear, 20°C, no clouds — what a failed lookup degrades to.
    pub fn fallback(now: DateTime<Utc>) -> Self {
        Self {
            condition: WeatherCondition::Clear,
            temperature: 20.0,
            cloudiness: 0.0,
            observed_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

// ────────────────────────────────────────────────────────────────────────────
// OpenWeather `/weather` response
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OpenWeatherResponse {
    pub weather: Vec<OpenWeatherCondition>,
    pub main: OpenWeatherMain,
    #[serde(default)]
    pub clouds: Option<OpenWeatherClouds>,
    /// Observation time, unix seconds.
    pub dt: i64,
}

#[derive(Debug, Deserialize)]
pub struct OpenWeatherCondition {
    pub main: String,
}

#[derive(Debug, Deserialize)]
pub struct OpenWeatherMain {
    pub temp: f64,
}

#[derive(Debug, Deserialize)]
pub struct OpenWeatherClouds {
    #[serde(default)]
    pub all: f64,
}

impl OpenWeatherResponse {
    pub fn into_attributes(self) -> Result<WeatherAttributes, WeatherError> {
        let condition = self
            .weather
            .first()
            .map(|w| WeatherCondition::from_provider_label(&w.main))
            .ok_or_else(|| WeatherError::Malformed("empty weather array".to_string()))?;

        let observed_at = DateTime::from_timestamp(self.dt, 0)
            .ok_or_else(|| WeatherError::Malformed(format!("dt out of range: {}", self.dt)))?;

        Ok(WeatherAttributes {
            condition,
            temperature: self.main.temp,
            cloudiness: self.clouds.map(|c| c.all).unwrap_or(0.0),
            observed_at,
        })
    }
}
