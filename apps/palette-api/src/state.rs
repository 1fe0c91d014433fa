use std::sync::Arc;

use crate::theme::PaletteGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Shared with the auto-update task; both write the current palette, last write wins.
    pub generator: Arc<PaletteGenerator>,
}
