mod clock;
mod color;
mod config;
mod errors;
mod routes;
mod state;
mod theme;
mod weather;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::clock::SystemClock;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;
use crate::theme::{spawn_auto_update, PaletteGenerator};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Palette API v{}", env!("CARGO_PKG_VERSION"));

    let generator = Arc::new(PaletteGenerator::new(&config.theme, Arc::new(SystemClock)));
    info!("Palette generator initialized: {:?}", generator.features());

    // Initial palette plus a refresh every interval
    let _auto_update = spawn_auto_update(generator.clone(), config.theme.refresh_interval);
    info!(
        "Palette auto-update every {} minutes",
        config.theme.refresh_interval.as_secs() / 60
    );

    let app = build_router(AppState { generator })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
