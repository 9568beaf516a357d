//! HTTP bridge to a provider-scraping sidecar.
//!
//! The sidecar wraps the scraping library and exposes its operations as JSON
//! endpoints. A 404 from a scrape endpoint means "nothing found"; any other
//! failure is reported as a generic provider error.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use streamscout_core::config::ProviderConfig;
use streamscout_core::urls::is_valid_http_url;
use streamscout_core::{
    ConfigError, EmbedMeta, EmbedScrapeOutput, MediaQuery, ProviderError, ProviderFactory,
    ProviderRegistry, RunOutput, SourceDescriptor, SourceScrapeOutput,
};
use tracing::trace;
use url::Url;

/// Provider registry backed by the sidecar's HTTP API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpProviderBridge {
    client: reqwest::Client,
    base_url: Url,
}

/// Body of an embed scrape request.
#[derive(Debug, Serialize)]
struct EmbedScrapeRequest<'a> {
    url: &'a str,
}

impl HttpProviderBridge {
    /// Creates a bridge from provider configuration.
    ///
    /// # Errors
    /// - `ConfigError::InvalidProviderUrl` - Base URL is not an http(s) URL
    /// - `ConfigError::InvalidValue` - HTTP client could not be built
    pub fn new(config: &ProviderConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.call_timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                setting: "provider client",
                reason: e.to_string(),
            })?;

        Self::with_client(client, &config.base_url)
    }

    /// Creates a bridge using an existing HTTP client.
    ///
    /// # Errors
    /// - `ConfigError::InvalidProviderUrl` - Base URL is not an http(s) URL
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidProviderUrl {
            url: base_url.to_string(),
        };
        if !is_valid_http_url(base_url) {
            return Err(invalid());
        }
        let base_url = Url::parse(base_url).map_err(|_| invalid())?;

        Ok(Self { client, base_url })
    }

    /// Sidecar base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // http(s) URLs always have a path, checked in `with_client`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        scraper: &str,
        segments: &[&str],
    ) -> Result<T, ProviderError> {
        let url = self.endpoint(segments);
        trace!(%url, "GET provider endpoint");
        let response = self.client.get(url).send().await;
        Self::decode(scraper, response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        scraper: &str,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ProviderError> {
        let url = self.endpoint(segments);
        trace!(%url, "POST provider endpoint");
        let response = self.client.post(url).json(body).send().await;
        Self::decode(scraper, response).await
    }

    async fn decode<T: DeserializeOwned>(
        scraper: &str,
        response: reqwest::Result<reqwest::Response>,
    ) -> Result<T, ProviderError> {
        let response = response
            .map_err(|e| ProviderError::other(scraper, format!("Sidecar request failed: {e}")))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(ProviderError::not_found(scraper)),
            status if !status.is_success() => {
                return Err(ProviderError::other(scraper, format!("Sidecar HTTP {status}")));
            }
            _ => {}
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProviderError::other(scraper, format!("Sidecar body unreadable: {e}")))?;
        serde_json::from_slice(&body).map_err(|e| {
            ProviderError::other(scraper, format!("Sidecar JSON parsing failed: {e}"))
        })
    }
}

#[async_trait]
impl ProviderRegistry for HttpProviderBridge {
    async fn list_sources(&self) -> Result<Vec<SourceDescriptor>, ProviderError> {
        self.get_json("listSources", &["sources"]).await
    }

    async fn list_embeds(&self) -> Result<Vec<EmbedMeta>, ProviderError> {
        self.get_json("listEmbeds", &["embeds"]).await
    }

    async fn run_source_scraper(
        &self,
        source_id: &str,
        media: &MediaQuery,
    ) -> Result<SourceScrapeOutput, ProviderError> {
        self.post_json(source_id, &["sources", source_id, "scrape"], media)
            .await
    }

    async fn run_embed_scraper(
        &self,
        embed_id: &str,
        url: &str,
    ) -> Result<EmbedScrapeOutput, ProviderError> {
        self.post_json(
            embed_id,
            &["embeds", embed_id, "scrape"],
            &EmbedScrapeRequest { url },
        )
        .await
    }

    async fn run_all(&self, media: &MediaQuery) -> Result<Option<RunOutput>, ProviderError> {
        self.post_json("runAll", &["run-all"], media).await
    }
}

/// Hands out bridge handles sharing one connection pool.
#[derive(Debug, Clone)]
pub struct HttpBridgeFactory {
    bridge: HttpProviderBridge,
}

impl HttpBridgeFactory {
    /// Creates a factory around a configured bridge.
    pub fn new(bridge: HttpProviderBridge) -> Self {
        Self { bridge }
    }
}

impl ProviderFactory for HttpBridgeFactory {
    fn build(&self) -> Arc<dyn ProviderRegistry> {
        Arc::new(self.bridge.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::Json;
    use axum::Router;
    use axum::extract::Path;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::{get, post};
    use serde_json::{Value, json};
    use streamscout_core::Stream;

    use super::*;

    async fn spawn_sidecar(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{address}")
    }

    fn bridge(base_url: &str) -> HttpProviderBridge {
        let config = ProviderConfig {
            base_url: base_url.to_string(),
            call_timeout: Duration::from_secs(5),
            ..Default::default()
        };
        HttpProviderBridge::new(&config).unwrap()
    }

    fn sidecar() -> Router {
        Router::new()
            .route(
                "/api/sources",
                get(|| async {
                    Json(json!([
                        { "id": "zeta", "name": "Zeta", "rank": 10, "type": "source" },
                        { "id": "alpha", "name": "Alpha", "rank": 200, "type": "source",
                          "mediaTypes": ["movie"] }
                    ]))
                }),
            )
            .route(
                "/api/embeds",
                get(|| async { Json(json!([{ "id": "e1", "name": "E1", "rank": 5, "type": "embed" }])) }),
            )
            .route(
                "/api/sources/{id}/scrape",
                post(|Path(id): Path<String>, Json(media): Json<Value>| async move {
                    match id.as_str() {
                        "alpha" => {
                            assert_eq!(media["type"], "movie");
                            (
                                AxumStatus::OK,
                                Json(json!({ "embeds": [{ "embedId": "e1", "url": "https://e.example/1" }] })),
                            )
                        }
                        "broken" => (AxumStatus::INTERNAL_SERVER_ERROR, Json(json!({ "error": "boom" }))),
                        _ => (AxumStatus::NOT_FOUND, Json(json!({ "error": "not_found" }))),
                    }
                }),
            )
            .route(
                "/api/embeds/{id}/scrape",
                post(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                    match id.as_str() {
                        "e1" => Json(json!({ "stream": [{
                            "type": "hls",
                            "id": "primary",
                            "playlist": body["url"].as_str().unwrap_or_default(),
                            "flags": [],
                            "captions": []
                        }] })),
                        _ => Json(json!({ "unexpected": true, "stream": "nope" })),
                    }
                }),
            )
            .route("/api/run-all", post(|| async { Json(Value::Null) }))
    }

    #[tokio::test]
    async fn test_list_sources_preserves_order() {
        let base = spawn_sidecar(sidecar()).await;
        let bridge = bridge(&format!("{base}/api"));

        let sources = bridge.list_sources().await.unwrap();

        let ids: Vec<&str> = sources.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha"]);
        assert_eq!(sources[1].media_types, Some(vec!["movie".to_string()]));
    }

    #[tokio::test]
    async fn test_trailing_slash_base_url_is_accepted() {
        let base = spawn_sidecar(sidecar()).await;
        let bridge = bridge(&format!("{base}/api/"));

        let embeds = bridge.list_embeds().await.unwrap();

        assert_eq!(embeds.len(), 1);
        assert_eq!(embeds[0].rank, 5);
    }

    #[tokio::test]
    async fn test_source_scrape_round_trip() {
        let base = spawn_sidecar(sidecar()).await;
        let bridge = bridge(&format!("{base}/api"));
        let media = MediaQuery::movie("Heat", 1995, "949");

        let output = bridge.run_source_scraper("alpha", &media).await.unwrap();

        assert_eq!(output.embeds.len(), 1);
        assert_eq!(output.embeds[0].embed_id, "e1");
    }

    #[tokio::test]
    async fn test_source_404_is_not_found() {
        let base = spawn_sidecar(sidecar()).await;
        let bridge = bridge(&format!("{base}/api"));
        let media = MediaQuery::movie("Heat", 1995, "949");

        let error = bridge.run_source_scraper("empty", &media).await.unwrap_err();

        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn test_source_500_is_other_failure() {
        let base = spawn_sidecar(sidecar()).await;
        let bridge = bridge(&format!("{base}/api"));
        let media = MediaQuery::movie("Heat", 1995, "949");

        let error = bridge.run_source_scraper("broken", &media).await.unwrap_err();

        assert!(matches!(error, ProviderError::Other { ref scraper, .. } if scraper == "broken"));
    }

    #[tokio::test]
    async fn test_embed_scrape_sends_url() {
        let base = spawn_sidecar(sidecar()).await;
        let bridge = bridge(&format!("{base}/api"));

        let output = bridge
            .run_embed_scraper("e1", "https://cdn.example/master.m3u8")
            .await
            .unwrap();

        match &output.stream[0] {
            Stream::Hls(hls) => assert_eq!(hls.playlist, "https://cdn.example/master.m3u8"),
            other => panic!("expected hls stream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_other_failure() {
        let base = spawn_sidecar(sidecar()).await;
        let bridge = bridge(&format!("{base}/api"));

        let error = bridge
            .run_embed_scraper("weird", "https://e.example/2")
            .await
            .unwrap_err();

        assert!(!error.is_not_found());
    }

    #[tokio::test]
    async fn test_run_all_null_is_none() {
        let base = spawn_sidecar(sidecar()).await;
        let bridge = bridge(&format!("{base}/api"));
        let media = MediaQuery::movie("Heat", 1995, "949");

        assert_eq!(bridge.run_all(&media).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unreachable_sidecar_is_other_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);
        let bridge = bridge(&format!("http://{address}"));

        let error = bridge.list_sources().await.unwrap_err();

        assert!(matches!(error, ProviderError::Other { .. }));
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        assert!(matches!(
            HttpProviderBridge::with_client(reqwest::Client::new(), "file:///tmp/sidecar"),
            Err(ConfigError::InvalidProviderUrl { .. })
        ));
    }

    #[test]
    fn test_factory_builds_independent_handles() {
        let factory = HttpBridgeFactory::new(bridge("http://127.0.0.1:5100"));

        let first = factory.build();
        let second = factory.build();

        assert!(!Arc::ptr_eq(&first, &second));
    }
}
