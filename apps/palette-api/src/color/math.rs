//! Color math — RGB/HSL conversion, WCAG luminance and contrast, golden-angle hue rotation.
//!
//! All functions are pure. `Hsl` is the interchange type: it renders to and parses from
//! the CSS form `hsl(H, S%, L%)`, which is also its serde representation.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fractional part of the golden ratio, used for the golden-angle complement.
pub const GOLDEN_RATIO_FRACTION: f64 = 0.618033988749895;

/// WCAG AA minimum contrast for normal-size text (large text only needs 3:1).
pub const WCAG_AA_NORMAL_TEXT: f64 = 4.5;

/// Pure white, the page background palettes are checked against.
pub const WHITE: Hsl = Hsl {
    hue: 0.0,
    saturation: 0.0,
    lightness: 100.0,
};

/// Threshold below which an sRGB channel is treated as linear (WCAG 2.x).
const LINEAR_THRESHOLD: f64 = 0.03928;
const GAMMA: f64 = 2.4;

static HSL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*hsl\(\s*(\d+),\s*(\d+)%,\s*(\d+)%\s*\)\s*$").expect("HSL pattern is valid")
});

#[derive(Debug, Error, PartialEq)]
pub enum ColorError {
    #[error("Invalid HSL string: {0}")]
    InvalidHsl(String),

    #[error("Color component out of range: {component}={value}")]
    OutOfRange { component: &'static str, value: f64 },
}

// ────────────────────────────────────────────────────────────────────────────
// Color types
// ────────────────────────────────────────────────────────────────────────────

/// An 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Hue in degrees, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl Hsl {
    pub const fn new(hue: f64, saturation: f64, lightness: f64) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }

    /// Builds a color after checking every component is finite and saturation/lightness
    /// sit in [0, 100].
    pub fn try_new(hue: f64, saturation: f64, lightness: f64) -> Result<Self, ColorError> {
        if !hue.is_finite() {
            return Err(ColorError::OutOfRange {
                component: "hue",
                value: hue,
            });
        }
        for (component, value) in [("saturation", saturation), ("lightness", lightness)] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(ColorError::OutOfRange { component, value });
            }
        }
        Ok(Self::new(hue, saturation, lightness))
    }

    /// Each component rounded to the nearest integer — the precision palettes are stored at.
    pub fn rounded(self) -> Self {
        Self::new(
            self.hue.round(),
            self.saturation.round(),
            self.lightness.round(),
        )
    }

    pub fn to_rgb(self) -> Rgb {
        hsl_to_rgb(self)
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue.round() as i64,
            self.saturation.round() as i64,
            self.lightness.round() as i64
        )
    }
}

impl FromStr for Hsl {
    type Err = ColorError;

    /// Accepts integer components only: `hsl(200, 60%, 50%)` or `hsl(200,60%,50%)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = HSL_PATTERN
            .captures(s)
            .ok_or_else(|| ColorError::InvalidHsl(s.to_string()))?;

        let component = |i: usize| -> Result<f64, ColorError> {
            caps[i]
                .parse::<u32>()
                .map(f64::from)
                .map_err(|_| ColorError::InvalidHsl(s.to_string()))
        };

        Ok(Hsl::new(component(1)?, component(2)?, component(3)?))
    }
}

impl From<Hsl> for String {
    fn from(value: Hsl) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Hsl {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Color-space conversion
// ────────────────────────────────────────────────────────────────────────────

/// Converts sRGB to HSL. Achromatic input (`max == min`) yields zero hue and saturation.
pub fn rgb_to_hsl(rgb: Rgb) -> Hsl {
    let r = f64::from(rgb.r) / 255.0;
    let g = f64::from(rgb.g) / 255.0;
    let b = f64::from(rgb.b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return Hsl::new(0.0, 0.0, l * 100.0);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsl::new(h / 6.0 * 360.0, s * 100.0, l * 100.0)
}

/// Converts HSL to sRGB, rounding each channel to 8 bits.
pub fn hsl_to_rgb(hsl: Hsl) -> Rgb {
    let h = hsl.hue / 360.0;
    let s = hsl.saturation / 100.0;
    let l = hsl.lightness / 100.0;

    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        )
    };

    Rgb::new(to_byte(r), to_byte(g), to_byte(b))
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

fn to_byte(channel: f64) -> u8 {
    (channel * 255.0).round().clamp(0.0, 255.0) as u8
}

// ────────────────────────────────────────────────────────────────────────────
// WCAG luminance and contrast
// ────────────────────────────────────────────────────────────────────────────

/// WCAG relative luminance in [0, 1].
pub fn relative_luminance(rgb: Rgb) -> f64 {
    let linear = |c: u8| {
        let c = f64::from(c) / 255.0;
        if c <= LINEAR_THRESHOLD {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(GAMMA)
        }
    };
    0.2126 * linear(rgb.r) + 0.7152 * linear(rgb.g) + 0.0722 * linear(rgb.b)
}

/// `(L_lighter + 0.05) / (L_darker + 0.05)`; independent of argument order.
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// True when `foreground` on `background` reaches the WCAG AA normal-text ratio.
pub fn meets_contrast(foreground: Hsl, background: Hsl) -> bool {
    contrast_ratio(foreground.to_rgb(), background.to_rgb()) >= WCAG_AA_NORMAL_TEXT
}

/// String form of [`meets_contrast`]; both arguments must be `hsl(H, S%, L%)` strings.
#[allow(dead_code)]
pub fn meets_accessibility_standards(
    foreground: &str,
    background: &str,
) -> Result<bool, ColorError> {
    let fg: Hsl = foreground.parse()?;
    let bg: Hsl = background.parse()?;
    Ok(meets_contrast(fg, bg))
}

/// Rotates a hue by the golden angle (360° × 0.618…), not the 180° complement.
pub fn complementary_hue(hue: f64) -> f64 {
    (hue + 360.0 * GOLDEN_RATIO_FRACTION).rem_euclid(360.0)
}
