//! Axum router setup.

pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the main router for the application.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/version", get(handlers::version))
        .route(
            "/sources/{source_id}/manifest.m3u8",
            get(handlers::source_manifest),
        )
        .route(
            "/flows/{flow_id}/manifest.m3u8",
            get(handlers::flow_manifest),
        )
        .route(
            "/flows/{flow_id}/segments/manifest.m3u8",
            get(handlers::segments_manifest),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
