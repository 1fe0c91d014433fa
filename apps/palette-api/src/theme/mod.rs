// Theme: palette generation from time of day, weather and season, plus the glue that
// publishes it (CSS variables, periodic refresh, HTTP handlers).

pub mod css;
pub mod generator;
pub mod handlers;
pub mod scheduler;

pub use generator::{FeatureFlags, PaletteGenerator};
pub use scheduler::spawn_auto_update;
