//! `GET /api/streams/sources` and per-request registry construction.

use axum::http::StatusCode;
use serde_json::json;
use streamscout_core::testing::ScriptedProviders;

use crate::common::{app, as_json, as_text, get, movie_body, post_json};

#[tokio::test]
async fn test_sources_round_trip_in_provider_order() {
    let providers = ScriptedProviders::new().with_sources(&["zeta", "alpha", "mid"]);

    let (status, bytes) = get(app(&providers), "/api/streams/sources").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        as_json(&bytes),
        json!([
            { "id": "zeta", "name": "zeta", "rank": 30, "type": "source" },
            { "id": "alpha", "name": "alpha", "rank": 20, "type": "source" },
            { "id": "mid", "name": "mid", "rank": 10, "type": "source" }
        ])
    );
}

#[tokio::test]
async fn test_sources_failure_is_bad_gateway() {
    let providers = ScriptedProviders::new().failing_list_sources("connection refused");

    let (status, bytes) = get(app(&providers), "/api/streams/sources").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(as_text(&bytes), "Failed to list sources");
}

#[tokio::test]
async fn test_registry_is_built_per_request_and_sources_listed_each_time() {
    let providers = ScriptedProviders::new().with_sources(&["flix"]);
    let router = app(&providers);

    post_json(router.clone(), "/api/streams/flix", &movie_body()).await;
    post_json(router.clone(), "/api/streams/flix", &movie_body()).await;
    get(router, "/api/streams/sources").await;

    assert_eq!(providers.build_count(), 3);
    let listings = providers
        .calls()
        .iter()
        .filter(|call| call.as_str() == "list_sources")
        .count();
    assert_eq!(listings, 3);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let providers = ScriptedProviders::new();

    let (status, _) = get(app(&providers), "/api/nothing-here").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
