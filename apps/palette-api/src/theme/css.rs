//! Renders a palette as CSS custom properties on `:root` for the presentation layer.

use crate::color::Palette;
use crate::theme::FeatureFlags;

pub const TRANSITION_DURATION: &str = "1s";

/// The palette roles the stylesheet consumes, by custom-property name.
pub fn css_variables(palette: &Palette) -> Vec<(&'static str, String)> {
    vec![
        ("--primary-color", palette.primary.main.to_string()),
        ("--primary-light", palette.primary.light.to_string()),
        ("--primary-dark", palette.primary.dark.to_string()),
        ("--secondary-color", palette.secondary.main.to_string()),
        ("--accent-first", palette.accent.first.to_string()),
        ("--accent-second", palette.accent.second.to_string()),
    ]
}

pub fn render_css(palette: &Palette, features: &FeatureFlags) -> String {
    let mut css = String::from(":root {\n");

    let mut variables = Vec::new();
    if features.transitions_enabled {
        variables.push(("--transition-duration", TRANSITION_DURATION.to_string()));
        variables.push((
            "--transition-all",
            "all var(--transition-duration) ease-in-out".to_string(),
        ));
    }
    variables.extend(css_variables(palette));

    for (name, value) in variables {
        css.push_str(&format!("  {name}: {value};\n"));
    }

    css.push_str("}\n");
    css
}
