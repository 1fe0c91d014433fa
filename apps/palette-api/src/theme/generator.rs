//! Palette generation — orchestrates the full environmental palette pipeline.
//!
//! Flow: time of day → base hue → (weather + season) → saturation/lightness →
//!       build palette → accessibility gate → store as current palette.
//!
//! `generate()` never fails. Missing credentials disable weather for the generator's
//! lifetime, a failed location lookup only affects the current call, and anything else
//! that goes wrong returns the static default palette.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::color::{
    build_palette, default_palette, meets_contrast, ColorError, Hsl, Palette, WHITE,
};
use crate::config::ThemeConfig;
use crate::weather::{season_for, Season, WeatherAttributes, WeatherCondition, WeatherContext};

/// Hue used when time-of-day variation is off (afternoon sky blue).
pub const DEFAULT_HUE: f64 = 200.0;
pub const DEFAULT_SATURATION: f64 = 60.0;
pub const DEFAULT_LIGHTNESS: f64 = 50.0;

/// Lightness floor applied by the single accessibility repair pass.
const MIN_REPAIRED_LIGHTNESS: f64 = 45.0;

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error(transparent)]
    Color(#[from] ColorError),
}

// ────────────────────────────────────────────────────────────────────────────
// Feature flags
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub weather_enabled: bool,
    pub transitions_enabled: bool,
    pub season_enabled: bool,
    pub time_based: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            weather_enabled: false,
            transitions_enabled: true,
            season_enabled: true,
            time_based: true,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Adjustment rules
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=20 => Self::Evening,
            _ => Self::Night,
        }
    }
}

/// Morning yellow, afternoon sky blue, evening purple, night deep blue.
/// `None` (time-based variation off) falls back to `DEFAULT_HUE`.
pub fn base_hue_for(time_of_day: Option<TimeOfDay>) -> f64 {
    match time_of_day {
        Some(TimeOfDay::Morning) => 60.0,
        Some(TimeOfDay::Afternoon) => 200.0,
        Some(TimeOfDay::Evening) => 280.0,
        Some(TimeOfDay::Night) => 240.0,
        None => DEFAULT_HUE,
    }
}

pub fn adjust_for_season(hue: f64, season: Season) -> f64 {
    let offset = match season {
        Season::Spring => 15.0,
        Season::Summer => -10.0,
        Season::Fall => 25.0,
        Season::Winter => -15.0,
    };
    (hue + offset).rem_euclid(360.0)
}

/// Saturation and lightness for the given conditions. Cloud cover, then condition, then
/// temperature; each stage works on the previous stage's output.
pub fn adjust_for_weather(weather: &WeatherAttributes) -> (f64, f64) {
    let mut saturation = DEFAULT_SATURATION;
    let mut lightness = DEFAULT_LIGHTNESS;

    if weather.cloudiness > 50.0 {
        saturation = (saturation - weather.cloudiness / 3.0).max(30.0);
        lightness = (lightness + weather.cloudiness / 4.0).min(70.0);
    }

    match weather.condition {
        WeatherCondition::Rain | WeatherCondition::Drizzle => {
            saturation = (saturation - 15.0).max(30.0);
            lightness = (lightness - 10.0).max(40.0);
        }
        WeatherCondition::Snow => {
            saturation = (saturation - 25.0).max(20.0);
            lightness = (lightness + 25.0).min(85.0);
        }
        WeatherCondition::Thunderstorm => {
            saturation = (saturation + 20.0).min(80.0);
            lightness = (lightness - 20.0).max(30.0);
        }
        WeatherCondition::Clear => {
            saturation = (saturation + 15.0).min(85.0);
        }
        WeatherCondition::Other => {}
    }

    if weather.temperature < 10.0 {
        saturation = (saturation - 10.0).max(40.0);
        lightness = (lightness + 10.0).min(70.0);
    } else if weather.temperature > 25.0 {
        saturation = (saturation + 10.0).min(90.0);
        lightness = (lightness - 5.0).max(45.0);
    }

    (saturation, lightness)
}

// ────────────────────────────────────────────────────────────────────────────
// Generator
// ────────────────────────────────────────────────────────────────────────────

/// One per process; shared between HTTP handlers and the auto-update task.
/// Concurrent `generate()` calls are not coordinated: the last one to finish wins.
pub struct PaletteGenerator {
    features: FeatureFlags,
    weather: Option<WeatherContext>,
    clock: Arc<dyn Clock>,
    current: RwLock<Option<Palette>>,
}

impl PaletteGenerator {
    /// Builds the weather context only when weather is requested and a key is configured.
    pub fn new(config: &ThemeConfig, clock: Arc<dyn Clock>) -> Self {
        let weather = if !config.features.weather_enabled {
            None
        } else {
            match WeatherContext::from_credential(
                config.weather_api_key.as_deref(),
                &config.weather_base_url,
                config.location,
                clock.clone(),
            ) {
                Ok(ctx) => Some(ctx),
                Err(e) => {
                    warn!("Weather features disabled: {e}");
                    None
                }
            }
        };

        Self::with_weather(config.features, weather, clock)
    }

    /// Clears `weather_enabled` when no context is supplied; it is never turned back on.
    pub fn with_weather(
        mut features: FeatureFlags,
        weather: Option<WeatherContext>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        if weather.is_none() {
            features.weather_enabled = false;
        }
        debug!("Palette generator features: {features:?}");

        Self {
            features,
            weather: weather.filter(|_| features.weather_enabled),
            clock,
            current: RwLock::new(None),
        }
    }

    pub fn features(&self) -> FeatureFlags {
        self.features
    }

    /// The last successfully generated palette, if any.
    pub fn current_palette(&self) -> Option<Palette> {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Static palette for first paint, before any generation has completed.
    pub fn default_palette(&self) -> Palette {
        default_palette()
    }

    /// Produces a palette for the current moment. Infallible to the caller.
    pub async fn generate(&self) -> Palette {
        match self.try_generate().await {
            Ok(palette) => palette,
            Err(e) => {
                warn!("Palette generation failed, using default palette: {e}");
                default_palette()
            }
        }
    }

    /// Forced regeneration (page became visible again, explicit refresh).
    pub async fn regenerate(&self) -> Palette {
        info!("Forced palette regeneration");
        self.generate().await
    }

    async fn try_generate(&self) -> Result<Palette, PaletteError> {
        let now = self.clock.now();

        let time_of_day = self
            .features
            .time_based
            .then(|| TimeOfDay::from_hour(now.hour()));
        let mut base_hue = base_hue_for(time_of_day);
        let mut season = None;
        let mut weather = None;

        if let Some(ctx) = self.weather.as_ref() {
            match ctx.resolve_location().await {
                Ok(coords) => {
                    weather = Some(ctx.fetch_current_conditions(coords).await);
                    if self.features.season_enabled {
                        let current = season_for(coords.lat, now);
                        base_hue = adjust_for_season(base_hue, current);
                        season = Some(current);
                    }
                }
                Err(e) => warn!("Weather/season signals unavailable for this palette: {e}"),
            }
        }

        let (saturation, lightness) = weather
            .as_ref()
            .map(adjust_for_weather)
            .unwrap_or((DEFAULT_SATURATION, DEFAULT_LIGHTNESS));

        debug!(
            "Generating palette: time_of_day={time_of_day:?}, season={season:?}, \
             weather={weather:?}, hue={base_hue}, saturation={saturation}, lightness={lightness}"
        );

        let base = Hsl::try_new(base_hue, saturation, lightness)?;
        let mut palette = build_palette(base.hue, base.saturation, base.lightness);

        if !meets_contrast(palette.primary.main, WHITE) {
            let repaired = lightness.max(MIN_REPAIRED_LIGHTNESS);
            debug!(
                "Primary {} fails contrast on white; rebuilding at lightness {repaired}",
                palette.primary.main
            );
            palette = build_palette(base.hue, base.saturation, repaired);
        }

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(palette);
        info!("Palette generated: primary={}", palette.primary.main);

        Ok(palette)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::weather::{ConfiguredLocation, Coordinates, WeatherError, WeatherProvider};

    struct FixedWeather {
        attributes: WeatherAttributes,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WeatherProvider for FixedWeather {
        async fn fetch(&self, _coords: Coordinates) -> Result<WeatherAttributes, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.attributes.clone())
        }
    }

    fn attrs(condition: WeatherCondition, temperature: f64, cloudiness: f64) -> WeatherAttributes {
        WeatherAttributes {
            condition,
            temperature,
            cloudiness,
            observed_at: Utc::now(),
        }
    }

    fn weather_generator(
        clock: Arc<ManualClock>,
        attributes: WeatherAttributes,
        location: Option<Coordinates>,
        features: FeatureFlags,
    ) -> (PaletteGenerator, Arc<FixedWeather>) {
        let provider = Arc::new(FixedWeather {
            attributes,
            calls: AtomicUsize::new(0),
        });
        let ctx = WeatherContext::new(
            provider.clone(),
            Arc::new(ConfiguredLocation::new(location)),
            clock.clone(),
        );
        let generator = PaletteGenerator::with_weather(features, Some(ctx), clock);
        (generator, provider)
    }

    fn weather_on() -> FeatureFlags {
        FeatureFlags {
            weather_enabled: true,
            ..FeatureFlags::default()
        }
    }

    #[test]
    fn test_time_of_day_partition() {
        assert_eq!(TimeOfDay::from_hour(4), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(20), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(21), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Night);
    }

    #[test]
    fn test_base_hues() {
        assert_eq!(base_hue_for(Some(TimeOfDay::Morning)), 60.0);
        assert_eq!(base_hue_for(Some(TimeOfDay::Afternoon)), 200.0);
        assert_eq!(base_hue_for(Some(TimeOfDay::Evening)), 280.0);
        assert_eq!(base_hue_for(Some(TimeOfDay::Night)), 240.0);
        assert_eq!(base_hue_for(None), DEFAULT_HUE);
    }

    #[test]
    fn test_season_offsets_wrap() {
        assert_eq!(adjust_for_season(60.0, Season::Spring), 75.0);
        assert_eq!(adjust_for_season(60.0, Season::Summer), 50.0);
        assert_eq!(adjust_for_season(350.0, Season::Fall), 15.0);
        assert_eq!(adjust_for_season(5.0, Season::Winter), 350.0);
    }

    #[test]
    fn test_weather_adjustment_cloudy_cold_snow() {
        // clouds: s = max(30, 60 - 80/3) = 33.33, l = min(70, 50 + 20) = 70
        // snow:   s = max(20, 8.33) = 20,         l = min(85, 95) = 85
        // cold:   s = max(40, 10) = 40,            l = min(70, 95) = 70
        let (s, l) = adjust_for_weather(&attrs(WeatherCondition::Snow, 5.0, 80.0));
        assert_eq!((s, l), (40.0, 70.0));
    }

    #[test]
    fn test_weather_adjustment_hot_clear() {
        // clear: s = 75; hot: s = 85, l = max(45, 45) = 45
        let (s, l) = adjust_for_weather(&attrs(WeatherCondition::Clear, 30.0, 0.0));
        assert_eq!((s, l), (85.0, 45.0));
    }

    #[test]
    fn test_weather_adjustment_thunderstorm_mild() {
        // thunderstorm: s = 80, l = 30; 10..=25 °C leaves both alone
        let (s, l) = adjust_for_weather(&attrs(WeatherCondition::Thunderstorm, 18.0, 40.0));
        assert_eq!((s, l), (80.0, 30.0));
    }

    #[test]
    fn test_weather_adjustment_rain_and_temperature_bounds() {
        let (s, l) = adjust_for_weather(&attrs(WeatherCondition::Drizzle, 10.0, 50.0));
        assert_eq!((s, l), (45.0, 40.0), "10°C and 50% clouds are both no-ops");

        let (s, l) = adjust_for_weather(&attrs(WeatherCondition::Other, 25.0, 0.0));
        assert_eq!((s, l), (60.0, 50.0));
    }

    #[tokio::test]
    async fn test_morning_without_weather_uses_defaults() {
        let clock = Arc::new(ManualClock::at(2024, 6, 1, 9, 0));
        let generator = PaletteGenerator::new(&ThemeConfig::default(), clock);

        let palette = generator.generate().await;
        assert_eq!(palette.primary.main, Hsl::new(60.0, 60.0, 50.0));
        assert_eq!(generator.current_palette(), Some(palette));
    }

    #[tokio::test]
    async fn test_time_based_off_uses_default_hue() {
        let clock = Arc::new(ManualClock::at(2024, 6, 1, 22, 0));
        let config = ThemeConfig {
            features: FeatureFlags {
                time_based: false,
                ..FeatureFlags::default()
            },
            ..ThemeConfig::default()
        };
        let palette = PaletteGenerator::new(&config, clock).generate().await;
        assert_eq!(palette.primary.main.hue, DEFAULT_HUE);
    }

    #[test]
    fn test_weather_without_key_is_disabled_permanently() {
        let clock = Arc::new(ManualClock::at(2024, 6, 1, 9, 0));
        let config = ThemeConfig {
            features: weather_on(),
            ..ThemeConfig::default()
        };
        let generator = PaletteGenerator::new(&config, clock);
        assert!(!generator.features().weather_enabled);
        assert!(generator.weather.is_none());
    }

    #[test]
    fn test_weather_with_key_stays_enabled() {
        let clock = Arc::new(ManualClock::at(2024, 6, 1, 9, 0));
        let config = ThemeConfig {
            features: weather_on(),
            weather_api_key: Some("0123456789abcdef0123456789abcdef".to_string()),
            ..ThemeConfig::default()
        };
        assert!(PaletteGenerator::new(&config, clock).features().weather_enabled);
    }

    #[tokio::test]
    async fn test_weather_and_season_shift_palette() {
        // June in the northern hemisphere → summer, −10°
        let clock = Arc::new(ManualClock::at(2024, 6, 1, 9, 0));
        let (generator, provider) = weather_generator(
            clock,
            attrs(WeatherCondition::Snow, 5.0, 80.0),
            Some(Coordinates::new(48.85, 2.35)),
            weather_on(),
        );

        let palette = generator.generate().await;
        assert_eq!(palette.primary.main, Hsl::new(50.0, 40.0, 70.0));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_season_disabled_keeps_time_hue() {
        let clock = Arc::new(ManualClock::at(2024, 6, 1, 9, 0));
        let features = FeatureFlags {
            season_enabled: false,
            ..weather_on()
        };
        let (generator, _) = weather_generator(
            clock,
            attrs(WeatherCondition::Other, 20.0, 0.0),
            Some(Coordinates::new(48.85, 2.35)),
            features,
        );

        let palette = generator.generate().await;
        assert_eq!(palette.primary.main.hue, 60.0);
    }

    #[tokio::test]
    async fn test_location_failure_degrades_single_call_only() {
        let clock = Arc::new(ManualClock::at(2024, 6, 1, 13, 0));
        let (generator, provider) = weather_generator(
            clock,
            attrs(WeatherCondition::Thunderstorm, 30.0, 90.0),
            None,
            weather_on(),
        );

        let palette = generator.generate().await;
        assert_eq!(palette.primary.main, Hsl::new(200.0, 60.0, 50.0));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert!(
            generator.features().weather_enabled,
            "a failed lookup must not disable weather"
        );
    }

    #[tokio::test]
    async fn test_non_finite_weather_readings_keep_default_attributes() {
        let clock = Arc::new(ManualClock::at(2024, 6, 1, 9, 0));
        let (generator, _) = weather_generator(
            clock,
            attrs(WeatherCondition::Other, f64::NAN, f64::NAN),
            Some(Coordinates::new(10.0, 10.0)),
            FeatureFlags {
                season_enabled: false,
                ..weather_on()
            },
        );

        let palette = generator.generate().await;
        assert_eq!(palette, build_palette(60.0, 60.0, 50.0));
    }

    #[tokio::test]
    async fn test_failed_contrast_rebuilds_at_minimum_lightness() {
        // rain at 20°C, clear skies: s = 45, l = 40, too light-on-white for 60° yellow
        let clock = Arc::new(ManualClock::at(2024, 6, 1, 9, 0));
        let (generator, _) = weather_generator(
            clock,
            attrs(WeatherCondition::Rain, 20.0, 0.0),
            Some(Coordinates::new(48.85, 2.35)),
            FeatureFlags {
                season_enabled: false,
                ..weather_on()
            },
        );
        let unrepaired = build_palette(60.0, 45.0, 40.0);
        assert!(!meets_contrast(unrepaired.primary.main, WHITE));

        let palette = generator.generate().await;
        assert_eq!(palette, build_palette(60.0, 45.0, MIN_REPAIRED_LIGHTNESS));
        assert_eq!(palette.primary.main.to_string(), "hsl(60, 45%, 45%)");
        assert_eq!(generator.current_palette(), Some(palette));
    }

    #[test]
    fn test_palette_error_is_transparent_over_color_error() {
        let err: PaletteError = ColorError::InvalidHsl("hsl(x)".to_string()).into();
        assert_eq!(err.to_string(), ColorError::InvalidHsl("hsl(x)".to_string()).to_string());
    }

    #[tokio::test]
    async fn test_regenerate_overwrites_current_palette() {
        let clock = Arc::new(ManualClock::at(2024, 6, 1, 9, 0));
        let generator = PaletteGenerator::new(&ThemeConfig::default(), clock.clone());

        assert!(generator.current_palette().is_none());
        generator.generate().await;
        clock.set(2024, 6, 1, 18, 30);
        let evening = generator.regenerate().await;

        assert_eq!(evening.primary.main.hue, 280.0);
        assert_eq!(generator.current_palette(), Some(evening));
    }

    #[test]
    fn test_default_palette_accessor() {
        let clock = Arc::new(ManualClock::at(2024, 6, 1, 9, 0));
        let generator = PaletteGenerator::new(&ThemeConfig::default(), clock);
        assert_eq!(
            generator.default_palette().primary.main.to_string(),
            "hsl(200, 60%, 50%)"
        );
    }
}
