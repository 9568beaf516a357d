//! API handlers for stream resolution and source listing

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::Json;
use serde::Serialize;
use streamscout_core::{
    RuntimeMode, SourceDescriptor, StreamAggregator, StreamResponse, parse_media_query,
};

use crate::error::ApiError;
use crate::server::AppState;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Always `"ok"` while the process serves requests
    pub status: &'static str,
    /// Which provider collaborator is in use
    pub mode: RuntimeMode,
}

/// `POST /api/streams`: resolves across all sources.
///
/// # Errors
/// - `ApiError::Scout` - Body is not a valid media query
pub async fn api_streams(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StreamResponse>, ApiError> {
    resolve_streams(&state, None, &body).await
}

/// `POST /api/streams/{source}`: resolves one named source.
///
/// # Errors
/// - `ApiError::Scout` - Invalid body or unsupported source
pub async fn api_streams_for_source(
    State(state): State<AppState>,
    Path(source): Path<String>,
    body: Bytes,
) -> Result<Json<StreamResponse>, ApiError> {
    resolve_streams(&state, Some(&source), &body).await
}

/// `POST /api/streams/sources`: the listing path taken as a source name.
///
/// # Errors
/// - `ApiError::Scout` - Invalid body or no source called "sources"
pub async fn api_streams_named_sources(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StreamResponse>, ApiError> {
    resolve_streams(&state, Some("sources"), &body).await
}

/// `GET /api/streams/sources`: the provider's sources, order preserved.
///
/// # Errors
/// - `ApiError::SourcesUnavailable` - The provider could not list sources
pub async fn api_sources(
    State(state): State<AppState>,
) -> Result<Json<Vec<SourceDescriptor>>, ApiError> {
    let providers = state.providers.build();
    let sources = providers
        .list_sources()
        .await
        .map_err(ApiError::SourcesUnavailable)?;

    Ok(Json(sources))
}

/// `GET /health`: liveness plus the runtime mode.
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        mode: state.config.runtime_mode,
    })
}

async fn resolve_streams(
    state: &AppState,
    source: Option<&str>,
    body: &[u8],
) -> Result<Json<StreamResponse>, ApiError> {
    let media = parse_media_query(body)?;
    tracing::info!(%media, source = ?source, "Resolving streams");

    // Fresh registry per request; nothing is shared between requests.
    let providers = state.providers.build();
    let response = StreamAggregator::new(providers.as_ref())
        .resolve(source, &media, state.config.streams.all_sources_shape)
        .await?;

    Ok(Json(response))
}
