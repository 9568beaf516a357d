//! Production wiring: router, HTTP bridge and a sidecar on an ephemeral port.

use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{get, post};
use serde_json::{Value, json};
use streamscout_core::{RuntimeMode, ScoutConfig};
use streamscout_providers::factory_for;
use streamscout_web::{AppState, create_router};

use crate::common::{as_json, as_text, get as get_route, movie_body, post_json};

async fn spawn_sidecar() -> String {
    let router = Router::new()
        .route(
            "/sources",
            get(|| async {
                Json(json!([
                    { "id": "flix", "name": "Flix", "rank": 300, "type": "source",
                      "mediaTypes": ["movie", "show"] },
                    { "id": "vault", "name": "Vault", "rank": 100, "type": "source" }
                ]))
            }),
        )
        .route(
            "/embeds",
            get(|| async {
                Json(json!([
                    { "id": "fast", "name": "Fast", "rank": 10, "type": "embed" },
                    { "id": "slow", "name": "Slow", "rank": 20, "type": "embed" }
                ]))
            }),
        )
        .route(
            "/sources/{id}/scrape",
            post(|Path(id): Path<String>, Json(media): Json<Value>| async move {
                if id != "flix" {
                    return (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })));
                }
                let tmdb = media["tmdbId"].as_str().unwrap_or_default().to_string();
                (
                    StatusCode::OK,
                    Json(json!({ "embeds": [
                        { "embedId": "fast", "url": format!("https://fast.example/{tmdb}") },
                        { "embedId": "slow", "url": format!("https://slow.example/{tmdb}") }
                    ] })),
                )
            }),
        )
        .route(
            "/embeds/{id}/scrape",
            post(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                let url = body["url"].as_str().unwrap_or_default().to_string();
                match id.as_str() {
                    "fast" => (
                        StatusCode::OK,
                        Json(json!({ "stream": [{
                            "type": "file",
                            "id": "primary",
                            "flags": [],
                            "captions": [],
                            "qualities": { "unknown": { "type": "mp4", "url": url } }
                        }] })),
                    ),
                    "slow" => (
                        StatusCode::OK,
                        Json(json!({ "stream": [{
                            "type": "hls",
                            "id": "primary",
                            "playlist": format!("{url}/index.m3u8"),
                            "flags": ["cors-allowed"],
                            "captions": [{
                                "id": "en", "url": "https://subs.example/en.vtt", "type": "vtt",
                                "hasCorsRestrictions": false, "language": "en"
                            }],
                            "thumbnailTrack": { "type": "vtt", "url": "https://subs.example/thumbs.vtt" }
                        }, {
                            "type": "dash",
                            "id": "secondary",
                            "manifest": format!("{url}/manifest.mpd")
                        }] })),
                    ),
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "boom" }))),
                }
            }),
        )
        .route(
            "/run-all",
            post(|| async {
                Json(json!({
                    "sourceId": "flix",
                    "embedId": "slow",
                    "stream": {
                        "type": "hls", "id": "primary",
                        "playlist": "https://slow.example/949/index.m3u8",
                        "flags": [], "captions": []
                    }
                }))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{address}")
}

async fn production_app() -> Router {
    let mut config = ScoutConfig::for_testing();
    config.runtime_mode = RuntimeMode::Production;
    config.provider.base_url = spawn_sidecar().await;

    let factory = factory_for(&config).unwrap();
    create_router(AppState::new(factory, config))
}

#[tokio::test]
async fn test_named_source_through_sidecar() {
    let app = production_app().await;

    let (status, bytes) = post_json(app, "/api/streams/flix", &movie_body()).await;

    assert_eq!(status, StatusCode::OK);
    let json = as_json(&bytes);
    assert_eq!(json["sourceId"], "flix");
    // "fast" only offers an unknown-quality file and is dropped.
    let streams = json["streams"].as_array().unwrap();
    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0]["type"], "hls");
    assert_eq!(streams[0]["playlist"], "https://slow.example/949/index.m3u8");
    assert_eq!(streams[0]["captions"][0]["type"], "vtt");
    // Fields and stream types the service does not model pass through.
    assert_eq!(
        streams[0]["thumbnailTrack"]["url"],
        "https://subs.example/thumbs.vtt"
    );
}

#[tokio::test]
async fn test_sidecar_not_found_source_is_empty_result() {
    let app = production_app().await;

    let (status, bytes) = post_json(app, "/api/streams/vault", &movie_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_json(&bytes), json!({"sourceId": "vault", "streams": []}));
}

#[tokio::test]
async fn test_unlisted_source_is_invalid_through_sidecar() {
    let app = production_app().await;

    let (status, bytes) = post_json(app, "/api/streams/elsewhere", &movie_body()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(as_text(&bytes), "Invalid source");
}

#[tokio::test]
async fn test_all_sources_through_sidecar() {
    let app = production_app().await;

    let (status, bytes) = post_json(app, "/api/streams", &movie_body()).await;

    assert_eq!(status, StatusCode::OK);
    let json = as_json(&bytes);
    assert_eq!(json["sourceId"], "flix");
    assert_eq!(json["streams"][0]["id"], "primary");
}

#[tokio::test]
async fn test_sources_listing_through_sidecar() {
    let app = production_app().await;

    let (status, bytes) = get_route(app, "/api/streams/sources").await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<String> = as_json(&bytes)
        .as_array()
        .unwrap()
        .iter()
        .map(|source| source["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["flix", "vault"]);
}

#[tokio::test]
async fn test_sidecar_down_degrades_gracefully() {
    let mut config = ScoutConfig::for_testing();
    config.runtime_mode = RuntimeMode::Production;
    // Nothing listens on the discard port.
    config.provider.base_url = "http://127.0.0.1:9".to_string();
    let factory = factory_for(&config).unwrap();
    let app = create_router(AppState::new(factory, config));

    let (stream_status, stream_bytes) =
        post_json(app.clone(), "/api/streams/flix", &movie_body()).await;
    let (sources_status, _) = get_route(app, "/api/streams/sources").await;

    assert_eq!(stream_status, StatusCode::OK);
    assert_eq!(as_json(&stream_bytes), json!({"sourceId": null, "streams": []}));
    assert_eq!(sources_status, StatusCode::BAD_GATEWAY);
}
