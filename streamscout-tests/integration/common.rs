//! Shared helpers for driving the router in-process.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use streamscout_core::ScoutConfig;
use streamscout_core::testing::ScriptedProviders;
use streamscout_web::{AppState, create_router};
use tower::ServiceExt;

pub fn app(providers: &ScriptedProviders) -> Router {
    app_with_config(providers, ScoutConfig::for_testing())
}

pub fn app_with_config(providers: &ScriptedProviders, config: ScoutConfig) -> Router {
    create_router(AppState::new(Arc::new(providers.clone()), config))
}

/// Sends a request and returns the status and raw body.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub fn as_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

pub fn as_text(body: &[u8]) -> String {
    String::from_utf8(body.to_vec()).unwrap()
}

pub fn movie_body() -> Value {
    json!({
        "type": "movie",
        "title": "Heat",
        "releaseYear": 1995,
        "tmdbId": "949",
        "imdbId": "tt0113277"
    })
}

pub fn show_body() -> Value {
    json!({
        "type": "show",
        "title": "Dark",
        "releaseYear": 2017,
        "tmdbId": "70523",
        "season": { "number": 1, "tmdbId": "88101" },
        "episode": { "number": 3, "tmdbId": "1339483" }
    })
}
