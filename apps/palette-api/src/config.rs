use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::theme::FeatureFlags;
use crate::weather::client::DEFAULT_BASE_URL;
use crate::weather::Coordinates;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub theme: ThemeConfig,
}

/// Everything the palette generator needs, passed in explicitly at construction.
#[derive(Debug, Clone)]
pub struct ThemeConfig {
    pub features: FeatureFlags,
    pub weather_api_key: Option<String>,
    pub weather_base_url: String,
    pub location: Option<Coordinates>,
    pub refresh_interval: Duration,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            features: FeatureFlags::default(),
            weather_api_key: None,
            weather_base_url: DEFAULT_BASE_URL.to_string(),
            location: None,
            refresh_interval: Duration::from_secs(30 * 60),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = FeatureFlags::default();
        let features = FeatureFlags {
            weather_enabled: env_flag("WEATHER_ENABLED", defaults.weather_enabled)?,
            transitions_enabled: env_flag("TRANSITIONS_ENABLED", defaults.transitions_enabled)?,
            season_enabled: env_flag("SEASON_ENABLED", defaults.season_enabled)?,
            time_based: env_flag("TIME_BASED", defaults.time_based)?,
        };

        let refresh_minutes = std::env::var("PALETTE_REFRESH_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .context("PALETTE_REFRESH_MINUTES must be a whole number of minutes")?;
        if refresh_minutes == 0 {
            bail!("PALETTE_REFRESH_MINUTES must be greater than zero");
        }

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            theme: ThemeConfig {
                features,
                weather_api_key: optional_env("OPENWEATHER_API_KEY"),
                weather_base_url: optional_env("OPENWEATHER_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                location: location_from_env()?,
                refresh_interval: Duration::from_secs(refresh_minutes * 60),
            },
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_flag(key: &str, default: bool) -> Result<bool> {
    match optional_env(key) {
        None => Ok(default),
        Some(raw) => parse_flag(&raw)
            .with_context(|| format!("Environment variable '{key}' must be a boolean, got '{raw}'")),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// LOCATION_LAT and LOCATION_LON must be set together or not at all.
fn location_from_env() -> Result<Option<Coordinates>> {
    match (optional_env("LOCATION_LAT"), optional_env("LOCATION_LON")) {
        (None, None) => Ok(None),
        (Some(lat), Some(lon)) => parse_coordinates(&lat, &lon).map(Some),
        _ => bail!("LOCATION_LAT and LOCATION_LON must be set together"),
    }
}

fn parse_coordinates(lat: &str, lon: &str) -> Result<Coordinates> {
    let lat: f64 = lat.trim().parse().context("LOCATION_LAT must be a number")?;
    let lon: f64 = lon.trim().parse().context("LOCATION_LON must be a number")?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        bail!("Location ({lat}, {lon}) is outside valid latitude/longitude ranges");
    }
    Ok(Coordinates::new(lat, lon))
}
