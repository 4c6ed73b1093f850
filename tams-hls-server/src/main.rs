//! TAMS HLS manifest server.
//!
//! Serves HLS multivariant and media playlists derived on demand from a
//! Time-Addressable Media Store, using the tams-hls-lib core.

mod config;
mod error;
mod http;
mod state;

use std::sync::Arc;

use clap::Parser;

use crate::config::Config;
use crate::error::Result;
use crate::http::create_router;
use crate::state::AppState;

/// Application name
const APP_NAME: &str = "tams-hls-server";

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(&config.log_level);

    tracing::info!("{} v{} starting", APP_NAME, env!("CARGO_PKG_VERSION"));

    if let Err(err) = config.validate() {
        tracing::error!("invalid configuration: {}", err);
        std::process::exit(2);
    }

    let state = Arc::new(AppState::from_config(&config)?);
    let app = create_router(state);

    tracing::info!("TAMS store at {}", config.tams_url);
    tracing::info!("Starting HTTP server on {}", config.bind);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize logging with tracing
fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "tams_hls_server={level},tams_hls_lib={level},tower_http=info"
                ))
            }),
        )
        .init();
}
