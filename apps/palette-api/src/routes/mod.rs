pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::theme::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/palette", get(handlers::handle_get_palette))
        .route(
            "/api/v1/palette/current",
            get(handlers::handle_get_current_palette),
        )
        .route(
            "/api/v1/palette/default",
            get(handlers::handle_get_default_palette),
        )
        .route(
            "/api/v1/palette/regenerate",
            post(handlers::handle_regenerate),
        )
        .route("/api/v1/palette/css", get(handlers::handle_palette_css))
        .route("/api/v1/palette/contrast", get(handlers::handle_contrast))
        .with_state(state)
}
