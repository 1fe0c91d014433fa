//! Axum route handlers for the Palette API.

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::color::math::contrast_ratio;
use crate::color::{meets_contrast, Hsl, Palette, WHITE};
use crate::errors::AppError;
use crate::state::AppState;
use crate::theme::css::render_css;
use crate::theme::FeatureFlags;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteSource {
    /// Last palette stored by a completed generation.
    Current,
    /// Static first-paint palette; nothing has been generated yet.
    Default,
    /// Generated by this request.
    Generated,
}

#[derive(Debug, Serialize)]
pub struct PaletteResponse {
    pub palette: Palette,
    pub source: PaletteSource,
    pub features: FeatureFlags,
}

#[derive(Debug, Deserialize)]
pub struct ContrastQuery {
    pub foreground: String,
    /// Defaults to white, the page background.
    pub background: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContrastResponse {
    pub foreground: Hsl,
    pub background: Hsl,
    pub ratio: f64,
    pub meets_wcag_aa: bool,
}

fn respond(state: &AppState, palette: Palette, source: PaletteSource) -> Json<PaletteResponse> {
    Json(PaletteResponse {
        palette,
        source,
        features: state.generator.features(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/palette
///
/// The last generated palette, or the default palette for first paint.
pub async fn handle_get_palette(State(state): State<AppState>) -> Json<PaletteResponse> {
    match state.generator.current_palette() {
        Some(palette) => respond(&state, palette, PaletteSource::Current),
        None => respond(&state, state.generator.default_palette(), PaletteSource::Default),
    }
}

/// GET /api/v1/palette/current
///
/// Strictly the last generated palette; 404 until one exists.
pub async fn handle_get_current_palette(
    State(state): State<AppState>,
) -> Result<Json<PaletteResponse>, AppError> {
    let palette = state
        .generator
        .current_palette()
        .ok_or_else(|| AppError::NotFound("No palette has been generated yet".to_string()))?;

    Ok(respond(&state, palette, PaletteSource::Current))
}

/// GET /api/v1/palette/default
pub async fn handle_get_default_palette(State(state): State<AppState>) -> Json<PaletteResponse> {
    respond(&state, state.generator.default_palette(), PaletteSource::Default)
}

/// POST /api/v1/palette/regenerate
///
/// Forces a generation (e.g. the page became visible again). Always succeeds.
pub async fn handle_regenerate(State(state): State<AppState>) -> Json<PaletteResponse> {
    let palette = state.generator.regenerate().await;
    respond(&state, palette, PaletteSource::Generated)
}

/// GET /api/v1/palette/css
///
/// `:root` custom properties for the current (or default) palette.
pub async fn handle_palette_css(State(state): State<AppState>) -> impl IntoResponse {
    let palette = state
        .generator
        .current_palette()
        .unwrap_or_else(|| state.generator.default_palette());
    let css = render_css(&palette, &state.generator.features());

    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], css)
}

/// GET /api/v1/palette/contrast?foreground=hsl(..)&background=hsl(..)
///
/// WCAG contrast ratio of two HSL colors and whether it reaches AA for normal text.
pub async fn handle_contrast(
    Query(query): Query<ContrastQuery>,
) -> Result<Json<ContrastResponse>, AppError> {
    let foreground: Hsl = query.foreground.parse()?;
    let background: Hsl = match query.background.as_deref() {
        Some(raw) => raw.parse()?,
        None => WHITE,
    };

    Ok(Json(ContrastResponse {
        foreground,
        background,
        ratio: contrast_ratio(foreground.to_rgb(), background.to_rgb()),
        meets_wcag_aa: meets_contrast(foreground, background),
    }))
}
