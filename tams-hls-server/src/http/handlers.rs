//! Manifest endpoint handlers.
//!
//! Each endpoint answers `200 OK` with an `application/vnd.apple.mpegurl`
//! body no matter what happens upstream: any derivation failure is logged
//! and degrades to the minimal valid playlist.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use tams_hls_lib::{
    build_master_playlist, build_media_playlist, empty_playlist, resolve_collections,
    ManifestError, Result, SegmentFetcher, SegmentLimit,
};

use crate::state::AppState;

fn m3u8_response(body: String) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/vnd.apple.mpegurl"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    (headers, body).into_response()
}

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ManifestError::Config(format!("invalid identifier `{raw}`")))
}

/// Version information endpoint
pub async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "online",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Master playlist for a source.
pub async fn source_manifest(
    State(state): State<Arc<AppState>>,
    Path(source_id): Path<String>,
) -> Response {
    match derive_source_manifest(&state, &source_id).await {
        Ok(playlist) => m3u8_response(playlist),
        Err(err) => {
            tracing::error!(source_id = %source_id, error = %err, "error generating source manifest");
            m3u8_response(empty_playlist())
        }
    }
}

async fn derive_source_manifest(state: &AppState, source_id: &str) -> Result<String> {
    let source_id = parse_id(source_id)?;
    let flows = state.catalog.flows_by_source(source_id).await?;
    let mut buckets = resolve_collections(state.catalog.as_ref(), flows).await?;
    let codec_map = state.codec_map.get().await;
    Ok(build_master_playlist(
        buckets.remove("video").unwrap_or_default(),
        buckets.remove("audio").unwrap_or_default(),
        buckets.remove("subtitle").unwrap_or_default(),
        &codec_map,
        state.signer.as_ref(),
    ))
}

/// Master playlist for a single flow (itself, plus its collection members).
pub async fn flow_manifest(
    State(state): State<Arc<AppState>>,
    Path(flow_id): Path<String>,
) -> Response {
    match derive_flow_manifest(&state, &flow_id).await {
        Ok(playlist) => m3u8_response(playlist),
        Err(err) => {
            tracing::error!(flow_id = %flow_id, error = %err, "error generating flow manifest");
            m3u8_response(empty_playlist())
        }
    }
}

async fn derive_flow_manifest(state: &AppState, flow_id: &str) -> Result<String> {
    let flow_id = parse_id(flow_id)?;
    let flow = state.catalog.flow(flow_id).await?;

    let mut roots = Vec::new();
    // A flow with a container holds essence itself and is a rendition of
    // its own; its collection members are resolved alongside it.
    if flow.container.is_some() {
        roots.push(flow.clone());
    }
    for member in &flow.flow_collection {
        roots.push(state.catalog.flow(member.id).await?);
    }

    let mut buckets = resolve_collections(state.catalog.as_ref(), roots).await?;
    let codec_map = state.codec_map.get().await;
    Ok(build_master_playlist(
        buckets.remove("video").unwrap_or_default(),
        buckets.remove("audio").unwrap_or_default(),
        buckets.remove("subtitle").unwrap_or_default(),
        &codec_map,
        state.signer.as_ref(),
    ))
}

/// Media playlist listing a flow's segments.
pub async fn segments_manifest(
    State(state): State<Arc<AppState>>,
    Path(flow_id): Path<String>,
) -> Response {
    match derive_segments_manifest(&state, &flow_id).await {
        Ok(playlist) => m3u8_response(playlist),
        Err(err) => {
            tracing::error!(flow_id = %flow_id, error = %err, "error generating segments manifest");
            m3u8_response(empty_playlist())
        }
    }
}

async fn derive_segments_manifest(state: &AppState, flow_id: &str) -> Result<String> {
    let flow_id = parse_id(flow_id)?;
    let flow = state.catalog.flow(flow_id).await?;
    let limit = SegmentLimit::from_tag(flow.tag("hls_segments"), state.default_segments);

    let fetcher = SegmentFetcher::new(state.catalog.as_ref(), flow_id, limit);
    let mut segments = fetcher.collect_all().await?;
    // The store lists newest-first; playback order is oldest-first.
    segments.reverse();

    build_media_playlist(&flow, &segments)
}
