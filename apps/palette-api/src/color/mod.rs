// Color core: pure color-space math and palette derivation.
// Nothing in here performs I/O or reads the clock.

pub mod math;
pub mod palette;

pub use math::{meets_accessibility_standards, meets_contrast, ColorError, Hsl, WHITE};
pub use palette::{build_palette, default_palette, Palette};
