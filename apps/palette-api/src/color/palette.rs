//! Palette builder — derives every role of a `Palette` from one base (hue, saturation, lightness).
//!
//! Derivation is deterministic and pure: identical inputs always produce identical palettes.
//! Components are stored rounded to integers, the precision the CSS strings carry.

use serde::{Deserialize, Serialize};

use crate::color::math::{complementary_hue, Hsl};

/// Base triple of the static fallback palette (afternoon sky blue).
pub const DEFAULT_BASE: (f64, f64, f64) = (200.0, 60.0, 50.0);

// ────────────────────────────────────────────────────────────────────────────
// Palette shape
// ────────────────────────────────────────────────────────────────────────────

/// Seven lightness steps of the base hue at normal saturation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrimaryShades {
    pub lightest: Hsl,
    pub lighter: Hsl,
    pub light: Hsl,
    pub main: Hsl,
    pub dark: Hsl,
    pub darker: Hsl,
    pub darkest: Hsl,
}

/// Golden-angle complement of the base hue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecondaryShades {
    pub main: Hsl,
    pub light: Hsl,
    pub dark: Hsl,
}

/// Vivid triadic pair plus muted analogous pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Accents {
    pub first: Hsl,
    pub second: Hsl,
    pub muted1: Hsl,
    pub muted2: Hsl,
}

/// Split-complementary and analogous hues at normal saturation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TertiaryColors {
    pub split1: Hsl,
    pub split2: Hsl,
    pub analogous1: Hsl,
    pub analogous2: Hsl,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub primary: PrimaryShades,
    pub secondary: SecondaryShades,
    pub accent: Accents,
    pub tertiary: TertiaryColors,
}

// ────────────────────────────────────────────────────────────────────────────
// Derivation rules
// ────────────────────────────────────────────────────────────────────────────

struct Shades {
    lightest: f64,
    lighter: f64,
    light: f64,
    main: f64,
    dark: f64,
    darker: f64,
    darkest: f64,
}

impl Shades {
    fn from_lightness(l: f64) -> Self {
        Self {
            lightest: (l + 30.0).min(95.0),
            lighter: (l + 15.0).min(85.0),
            light: (l + 7.0).min(75.0),
            main: l,
            dark: (l - 7.0).max(25.0),
            darker: (l - 15.0).max(15.0),
            darkest: (l - 30.0).max(5.0),
        }
    }
}

struct Saturations {
    muted: f64,
    normal: f64,
    vivid: f64,
}

impl Saturations {
    fn from_saturation(s: f64) -> Self {
        Self {
            muted: (s - 20.0).max(20.0),
            normal: s,
            vivid: (s + 20.0).min(100.0),
        }
    }
}

/// Hue relationships around the base hue. `split` keeps the literal +150°/+210°
/// offsets from the base rather than ±30° around the complement.
struct Hues {
    base: f64,
    complementary: f64,
    split: (f64, f64),
    triadic: (f64, f64),
    analogous: (f64, f64),
}

impl Hues {
    fn around(base: f64) -> Self {
        Self {
            base,
            complementary: complementary_hue(base),
            split: ((base + 150.0) % 360.0, (base + 210.0) % 360.0),
            triadic: ((base + 120.0) % 360.0, (base + 240.0) % 360.0),
            analogous: ((base + 30.0) % 360.0, (base - 30.0 + 360.0) % 360.0),
        }
    }
}

fn hsl(hue: f64, saturation: f64, lightness: f64) -> Hsl {
    Hsl::new(hue, saturation, lightness).rounded()
}

/// Builds the full palette. `base_hue` is expected in [0, 360); saturation and
/// lightness in [0, 100].
pub fn build_palette(base_hue: f64, base_saturation: f64, base_lightness: f64) -> Palette {
    let hues = Hues::around(base_hue);
    let shades = Shades::from_lightness(base_lightness);
    let sat = Saturations::from_saturation(base_saturation);

    Palette {
        primary: PrimaryShades {
            lightest: hsl(hues.base, sat.normal, shades.lightest),
            lighter: hsl(hues.base, sat.normal, shades.lighter),
            light: hsl(hues.base, sat.normal, shades.light),
            main: hsl(hues.base, sat.normal, shades.main),
            dark: hsl(hues.base, sat.normal, shades.dark),
            darker: hsl(hues.base, sat.normal, shades.darker),
            darkest: hsl(hues.base, sat.normal, shades.darkest),
        },
        secondary: SecondaryShades {
            main: hsl(hues.complementary, sat.normal, shades.main),
            light: hsl(hues.complementary, sat.normal, shades.light),
            dark: hsl(hues.complementary, sat.normal, shades.dark),
        },
        accent: Accents {
            first: hsl(hues.triadic.0, sat.vivid, shades.main),
            second: hsl(hues.triadic.1, sat.vivid, shades.main),
            muted1: hsl(hues.analogous.0, sat.muted, shades.light),
            muted2: hsl(hues.analogous.1, sat.muted, shades.light),
        },
        tertiary: TertiaryColors {
            split1: hsl(hues.split.0, sat.normal, shades.main),
            split2: hsl(hues.split.1, sat.normal, shades.main),
            analogous1: hsl(hues.analogous.0, sat.normal, shades.main),
            analogous2: hsl(hues.analogous.1, sat.normal, shades.main),
        },
    }
}

/// The static palette used for first paint and whenever generation fails.
pub fn default_palette() -> Palette {
    let (hue, saturation, lightness) = DEFAULT_BASE;
    build_palette(hue, saturation, lightness)
}
