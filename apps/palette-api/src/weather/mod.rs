// Weather context: location resolution, provider client, cached current conditions
// and the season derived from latitude. Lookups degrade to default conditions rather
// than failing the palette generation that depends on them.

pub mod client;
pub mod context;
pub mod location;
pub mod models;

use thiserror::Error;

pub use client::{OpenWeatherClient, WeatherProvider};
pub use context::{season_for, WeatherContext};
pub use location::{ConfiguredLocation, LocationProvider};
pub use models::{Coordinates, Season, WeatherAttributes, WeatherCondition};

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Weather API key is missing or blank")]
    MissingCredential,

    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Weather API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Malformed weather response: {0}")]
    Malformed(String),
}
