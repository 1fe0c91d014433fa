//! Location resolution. A server has no device geolocation, so the position comes from
//! configuration; an unconfigured position behaves like a denied permission prompt.

use async_trait::async_trait;

use crate::weather::{Coordinates, WeatherError};

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn resolve_location(&self) -> Result<Coordinates, WeatherError>;
}

/// Fixed coordinates from configuration, or none at all.
pub struct ConfiguredLocation(Option<Coordinates>);

impl ConfiguredLocation {
    pub fn new(coordinates: Option<Coordinates>) -> Self {
        Self(coordinates)
    }
}

#[async_trait]
impl LocationProvider for ConfiguredLocation {
    async fn resolve_location(&self) -> Result<Coordinates, WeatherError> {
        self.0.ok_or_else(|| {
            WeatherError::LocationUnavailable("no location configured".to_string())
        })
    }
}
