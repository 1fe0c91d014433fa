//! Weather client — fetches current conditions from an OpenWeather-compatible endpoint.
//!
//! Callers go through `WeatherProvider` so the cache and the generator can be exercised
//! against fakes. Failures are returned as `WeatherError`; turning them into default
//! conditions is the context's job, not the client's.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::weather::models::OpenWeatherResponse;
use crate::weather::{Coordinates, WeatherAttributes, WeatherError};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// OpenWeather keys are 32 hex characters; shorter keys are accepted but logged.
const EXPECTED_KEY_LEN: usize = 32;

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch(&self, coords: Coordinates) -> Result<WeatherAttributes, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct OpenWeatherError {
    message: String,
}

#[derive(Clone)]
pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenWeatherClient {
    /// Fails with `MissingCredential` on a blank key, or `Http` if the HTTP client
    /// cannot be built.
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, WeatherError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(WeatherError::MissingCredential);
        }
        if api_key.len() < EXPECTED_KEY_LEN {
            warn!(
                "Weather API key is {} characters, expected {}; it may be invalid",
                api_key.len(),
                EXPECTED_KEY_LEN
            );
        }

        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch(&self, coords: Coordinates) -> Result<WeatherAttributes, WeatherError> {
        debug!("Requesting current weather for ({}, {})", coords.lat, coords.lon);

        let response = self
            .client
            .get(format!("{}/weather", self.base_url))
            .query(&[
                ("lat", coords.lat.to_string()),
                ("lon", coords.lon.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenWeatherError>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: OpenWeatherResponse = serde_json::from_str(&body)?;
        let attributes = parsed.into_attributes()?;

        debug!(
            "Weather received: condition={:?}, temp={}, clouds={}",
            attributes.condition, attributes.temperature, attributes.cloudiness
        );

        Ok(attributes)
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;
    use crate::weather::WeatherCondition;

    const API_KEY: &str = "0123456789abcdef0123456789abcdef";

    const SNOW_BODY: &str = r#"{
        "weather": [{"main": "Snow", "description": "light snow"}],
        "main": {"temp": -2.5},
        "clouds": {"all": 90},
        "dt": 1705312800
    }"#;

    #[test]
    fn test_blank_key_is_missing_credential() {
        assert!(matches!(
            OpenWeatherClient::new("   ", DEFAULT_BASE_URL),
            Err(WeatherError::MissingCredential)
        ));
    }

    #[test]
    fn test_short_key_is_still_accepted() {
        assert!(OpenWeatherClient::new("short", DEFAULT_BASE_URL).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_sends_metric_query_and_parses_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/weather")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("lat".into(), "59.33".into()),
                Matcher::UrlEncoded("lon".into(), "18.06".into()),
                Matcher::UrlEncoded("appid".into(), API_KEY.into()),
                Matcher::UrlEncoded("units".into(), "metric".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SNOW_BODY)
            .create_async()
            .await;

        let client = OpenWeatherClient::new(API_KEY, &server.url()).unwrap();
        let attrs = client.fetch(Coordinates::new(59.33, 18.06)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(attrs.condition, WeatherCondition::Snow);
        assert_eq!(attrs.temperature, -2.5);
        assert_eq!(attrs.cloudiness, 90.0);
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/weather")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"cod": 401, "message": "Invalid API key."}"#)
            .create_async()
            .await;

        let client = OpenWeatherClient::new(API_KEY, &server.url()).unwrap();
        match client.fetch(Coordinates::new(1.0, 2.0)).await {
            Err(WeatherError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API key.");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/weather")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = OpenWeatherClient::new(API_KEY, &server.url()).unwrap();
        assert!(matches!(
            client.fetch(Coordinates::new(1.0, 2.0)).await,
            Err(WeatherError::Parse(_))
        ));
    }
}
