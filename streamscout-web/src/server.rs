//! JSON API server for Streamscout
//!
//! Wires the stream endpoints to the provider factory and wraps them in the
//! request-level timeout, CORS and tracing layers.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use streamscout_core::{ProviderFactory, ScoutConfig};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::handlers::{
    api_sources, api_streams, api_streams_for_source, api_streams_named_sources, health,
};

/// Shared handler state.
///
/// Holds the factory rather than a registry so each request builds its own.
#[derive(Clone)]
pub struct AppState {
    /// Builds a provider registry per request
    pub providers: Arc<dyn ProviderFactory>,
    /// Server and stream settings
    pub config: Arc<ScoutConfig>,
}

impl AppState {
    /// Creates state from a provider factory and configuration.
    pub fn new(providers: Arc<dyn ProviderFactory>, config: ScoutConfig) -> Self {
        Self {
            providers,
            config: Arc::new(config),
        }
    }
}

/// Builds the application router with all layers applied.
pub fn create_router(state: AppState) -> Router {
    let request_timeout = state.config.server.request_timeout;

    Router::new()
        .route("/api/streams", post(api_streams))
        .route(
            "/api/streams/sources",
            get(api_sources).post(api_streams_named_sources),
        )
        .route("/api/streams/{source}", post(api_streams_for_source))
        .route("/health", get(health))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C.
///
/// # Errors
/// - `std::io::Error` - Binding the listener or serving failed
pub async fn run_server(
    config: ScoutConfig,
    providers: Arc<dyn ProviderFactory>,
) -> std::io::Result<()> {
    let address = config.bind_address();
    let mode = config.runtime_mode;
    let app = create_router(AppState::new(providers, config));

    let listener = tokio::net::TcpListener::bind(&address).await?;
    let local_address = listener.local_addr()?;
    tracing::info!(address = %local_address, %mode, "Streamscout API listening");
    println!("Streamscout API running on http://{local_address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
