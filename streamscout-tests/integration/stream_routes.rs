//! `POST /api/streams` and `POST /api/streams/{source}` behaviour.

use axum::http::StatusCode;
use serde_json::json;
use streamscout_core::testing::{ScriptedProviders, file_stream, hls_stream};
use streamscout_core::{ProviderError, ResponseShape, RunOutput, ScoutConfig};

use crate::common::{app, app_with_config, as_json, as_text, movie_body, post_json, show_body};

fn single_embed_source() -> ScriptedProviders {
    ScriptedProviders::new()
        .with_sources(&["flix", "archive"])
        .with_embed_metas(&[("e1", 1)])
        .with_source_embeds("flix", &["e1"])
        .with_embed_streams("e1", vec![hls_stream("s1")])
}

#[tokio::test]
async fn test_valid_movie_and_show_are_accepted() {
    let providers = single_embed_source();

    let (movie_status, _) = post_json(app(&providers), "/api/streams/flix", &movie_body()).await;
    let (show_status, _) = post_json(app(&providers), "/api/streams/flix", &show_body()).await;

    assert_eq!(movie_status, StatusCode::OK);
    assert_eq!(show_status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_title_is_rejected_with_field_name() {
    let providers = single_embed_source();
    let mut body = movie_body();
    body.as_object_mut().unwrap().remove("title");

    let (status, bytes) = post_json(app(&providers), "/api/streams/flix", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(as_text(&bytes).contains("title"));
}

#[tokio::test]
async fn test_release_year_bounds_are_enforced() {
    let providers = single_embed_source();

    for year in [1899, 2101] {
        let mut body = movie_body();
        body["releaseYear"] = json!(year);

        let (status, bytes) = post_json(app(&providers), "/api/streams", &body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "year {year}");
        assert!(as_text(&bytes).contains("releaseYear"));
    }

    let mut edge = movie_body();
    edge["releaseYear"] = json!(1900);
    let (status, _) = post_json(app(&providers), "/api/streams", &edge).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_show_without_season_is_rejected() {
    let providers = single_embed_source();
    let mut body = show_body();
    body.as_object_mut().unwrap().remove("season");

    let (status, bytes) = post_json(app(&providers), "/api/streams/flix", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(as_text(&bytes).contains("season"));
}

#[tokio::test]
async fn test_non_json_body_is_rejected() {
    let providers = single_embed_source();
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/streams/flix")
        .body(axum::body::Body::from("title=Heat"))
        .unwrap();

    let (status, bytes) = crate::common::send(app(&providers), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(as_text(&bytes), "body must be valid JSON");
}

#[tokio::test]
async fn test_unknown_source_is_invalid() {
    let providers = single_embed_source();

    let (status, bytes) = post_json(app(&providers), "/api/streams/bogus", &movie_body()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(as_text(&bytes), "Invalid source");
    assert!(providers.embed_calls().is_empty());
}

#[tokio::test]
async fn test_validation_runs_before_source_check() {
    let providers = single_embed_source();

    let (status, bytes) = post_json(app(&providers), "/api/streams/bogus", &json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_ne!(as_text(&bytes), "Invalid source");
}

#[tokio::test]
async fn test_source_not_found_keeps_source_id() {
    let providers = single_embed_source().with_source_not_found("archive");

    let (status, bytes) = post_json(app(&providers), "/api/streams/archive", &movie_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_json(&bytes), json!({"sourceId": "archive", "streams": []}));
}

#[tokio::test]
async fn test_source_failure_answers_with_no_streams() {
    let providers = single_embed_source().with_source_failure("archive", "upstream exploded");

    let (status, bytes) = post_json(app(&providers), "/api/streams/archive", &movie_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_json(&bytes), json!({"sourceId": null, "streams": []}));
}

#[tokio::test]
async fn test_listing_failure_answers_with_no_streams() {
    let providers = ScriptedProviders::new().failing_list_sources("sidecar down");

    let (status, bytes) = post_json(app(&providers), "/api/streams/flix", &movie_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_json(&bytes), json!({"sourceId": null, "streams": []}));
}

#[tokio::test]
async fn test_embeds_resolve_in_literal_rank_order() {
    // e3 has no rank: sorted last ascending, so first after the reversal.
    let providers = ScriptedProviders::new()
        .with_sources(&["flix"])
        .with_embed_metas(&[("e1", 2), ("e2", 1)])
        .with_source_embeds("flix", &["e1", "e2", "e3"])
        .with_embed_streams("e1", vec![hls_stream("from-e1")])
        .with_embed_streams("e2", vec![hls_stream("from-e2")])
        .with_embed_streams("e3", vec![hls_stream("from-e3")]);

    let (status, bytes) = post_json(app(&providers), "/api/streams/flix", &movie_body()).await;

    assert_eq!(status, StatusCode::OK);
    let json = as_json(&bytes);
    let ids: Vec<&str> = json["streams"]
        .as_array()
        .unwrap()
        .iter()
        .map(|stream| stream["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["from-e3", "from-e1", "from-e2"]);
    assert_eq!(providers.embed_calls(), vec!["e3", "e1", "e2"]);
}

#[tokio::test]
async fn test_unknown_only_file_streams_are_excluded() {
    let providers = ScriptedProviders::new()
        .with_sources(&["flix"])
        .with_embed_metas(&[("e1", 1), ("e2", 2)])
        .with_source_embeds("flix", &["e1", "e2"])
        .with_embed_streams("e1", vec![file_stream("mixed", &["unknown", "720p"])])
        .with_embed_streams("e2", vec![file_stream("unknown-only", &["unknown"])]);

    let (_, bytes) = post_json(app(&providers), "/api/streams/flix", &movie_body()).await;

    let json = as_json(&bytes);
    assert_eq!(json["streams"].as_array().unwrap().len(), 1);
    assert_eq!(json["streams"][0]["id"], "mixed");
    assert_eq!(json["streams"][0]["type"], "file");
}

#[tokio::test]
async fn test_embed_failures_do_not_fail_the_request() {
    let providers = ScriptedProviders::new()
        .with_sources(&["flix"])
        .with_embed_metas(&[("good", 1), ("missing", 2), ("broken", 3), ("empty", 4)])
        .with_source_embeds("flix", &["good", "missing", "broken", "empty"])
        .with_embed_streams("good", vec![hls_stream("ok")])
        .with_embed_not_found("missing")
        .with_embed_failure("broken", "parse error")
        .with_embed_streams("empty", Vec::new());

    let (status, bytes) = post_json(app(&providers), "/api/streams/flix", &movie_body()).await;

    assert_eq!(status, StatusCode::OK);
    let json = as_json(&bytes);
    assert_eq!(json["sourceId"], "flix");
    assert_eq!(json["streams"].as_array().unwrap().len(), 1);
    // Every embed is still attempted, best-ranked last.
    assert_eq!(
        providers.embed_calls(),
        vec!["empty", "broken", "missing", "good"]
    );
}

#[tokio::test]
async fn test_only_first_stream_of_an_embed_is_kept() {
    let providers = ScriptedProviders::new()
        .with_sources(&["flix"])
        .with_embed_metas(&[("e1", 1)])
        .with_source_embeds("flix", &["e1"])
        .with_embed_streams("e1", vec![hls_stream("first"), hls_stream("second")]);

    let (_, bytes) = post_json(app(&providers), "/api/streams/flix", &movie_body()).await;

    let json = as_json(&bytes);
    assert_eq!(json["streams"].as_array().unwrap().len(), 1);
    assert_eq!(json["streams"][0]["id"], "first");
}

#[tokio::test]
async fn test_all_sources_result_is_wrapped() {
    let providers = ScriptedProviders::new().with_run_all(Ok(Some(RunOutput {
        source_id: "flix".to_string(),
        embed_id: Some("e1".to_string()),
        stream: hls_stream("s1"),
        extra: Default::default(),
    })));

    let (status, bytes) = post_json(app(&providers), "/api/streams", &movie_body()).await;

    assert_eq!(status, StatusCode::OK);
    let json = as_json(&bytes);
    assert_eq!(json["sourceId"], "flix");
    assert_eq!(json["streams"].as_array().unwrap().len(), 1);
    assert_eq!(json["streams"][0]["id"], "s1");
}

#[tokio::test]
async fn test_all_sources_nothing_found_is_null_source() {
    let providers = ScriptedProviders::new().with_run_all(Ok(None));

    let (status, bytes) = post_json(app(&providers), "/api/streams", &movie_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_json(&bytes), json!({"sourceId": null, "streams": []}));
}

#[tokio::test]
async fn test_all_sources_failure_is_null_source() {
    let providers =
        ScriptedProviders::new().with_run_all(Err(ProviderError::other("runAll", "timeout")));

    let (status, bytes) = post_json(app(&providers), "/api/streams", &movie_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_json(&bytes), json!({"sourceId": null, "streams": []}));
}

#[tokio::test]
async fn test_raw_shape_passes_provider_output_through() {
    let mut config = ScoutConfig::for_testing();
    config.streams.all_sources_shape = ResponseShape::Raw;
    let found = ScriptedProviders::new().with_run_all(Ok(Some(RunOutput {
        source_id: "flix".to_string(),
        embed_id: Some("e1".to_string()),
        stream: hls_stream("s1"),
        extra: Default::default(),
    })));
    let empty = ScriptedProviders::new().with_run_all(Ok(None));

    let (_, found_bytes) =
        post_json(app_with_config(&found, config.clone()), "/api/streams", &movie_body()).await;
    let (status, empty_bytes) =
        post_json(app_with_config(&empty, config), "/api/streams", &movie_body()).await;

    let json = as_json(&found_bytes);
    assert_eq!(json["sourceId"], "flix");
    assert_eq!(json["embedId"], "e1");
    assert_eq!(json["stream"]["id"], "s1");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_json(&empty_bytes), serde_json::Value::Null);
}

#[tokio::test]
async fn test_raw_shape_does_not_apply_to_named_sources() {
    let mut config = ScoutConfig::for_testing();
    config.streams.all_sources_shape = ResponseShape::Raw;
    let providers = single_embed_source();

    let (_, bytes) = post_json(
        app_with_config(&providers, config),
        "/api/streams/flix",
        &movie_body(),
    )
    .await;

    let json = as_json(&bytes);
    assert_eq!(json["sourceId"], "flix");
    assert_eq!(json["streams"][0]["id"], "s1");
}
