//! Provider collaborator seam.
//!
//! The actual scraping of streaming sites happens behind [`ProviderRegistry`].
//! This crate only orchestrates calls to it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ProviderError;
use crate::media::MediaQuery;
use crate::stream::Stream;

/// Whether a scraper produces embeds (source) or streams (embed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScraperKind {
    Source,
    Embed,
}

/// Metadata of a source or embed scraper as reported by the provider.
///
/// Read-only to this crate. `GET /api/streams/sources` returns these verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScraperMeta {
    pub id: String,
    pub name: String,
    pub rank: i64,
    #[serde(rename = "type")]
    pub kind: ScraperKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_types: Option<Vec<String>>,
}

/// A source scraper descriptor.
pub type SourceDescriptor = ScraperMeta;

/// An embed scraper descriptor; its `rank` orders embeds during resolution.
pub type EmbedMeta = ScraperMeta;

/// Embed discovered while scraping a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedDescriptor {
    pub embed_id: String,
    pub url: String,
}

/// Result of running one source scraper.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceScrapeOutput {
    #[serde(default)]
    pub embeds: Vec<EmbedDescriptor>,
}

/// Result of running one embed scraper.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EmbedScrapeOutput {
    #[serde(default)]
    pub stream: Vec<Stream>,
}

/// Best single outcome found by trying every source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutput {
    pub source_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_id: Option<String>,
    pub stream: Stream,
    /// Provider fields not modelled above, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Handle onto the external provider-scraping library.
///
/// All lists are returned in provider order. Failures distinguish "ran but
/// found nothing" ([`ProviderError::NotFound`]) from everything else.
#[async_trait]
pub trait ProviderRegistry: Send + Sync + std::fmt::Debug {
    /// Sources currently supported, in provider order.
    ///
    /// # Errors
    /// - `ProviderError::Other` - The provider could not be reached
    async fn list_sources(&self) -> Result<Vec<SourceDescriptor>, ProviderError>;

    /// Embed scrapers and their ranks.
    ///
    /// # Errors
    /// - `ProviderError::Other` - The provider could not be reached
    async fn list_embeds(&self) -> Result<Vec<EmbedMeta>, ProviderError>;

    /// Runs one source scraper for `media`.
    ///
    /// # Errors
    /// - `ProviderError::NotFound` - The source has nothing for this media
    /// - `ProviderError::Other` - Scraper failure
    async fn run_source_scraper(
        &self,
        source_id: &str,
        media: &MediaQuery,
    ) -> Result<SourceScrapeOutput, ProviderError>;

    /// Runs one embed scraper against `url`.
    ///
    /// # Errors
    /// - `ProviderError::NotFound` - The embed yielded nothing
    /// - `ProviderError::Other` - Scraper failure
    async fn run_embed_scraper(
        &self,
        embed_id: &str,
        url: &str,
    ) -> Result<EmbedScrapeOutput, ProviderError>;

    /// Tries all sources and returns the best single outcome, if any.
    ///
    /// # Errors
    /// - `ProviderError::NotFound` - No source produced anything
    /// - `ProviderError::Other` - Provider failure
    async fn run_all(&self, media: &MediaQuery) -> Result<Option<RunOutput>, ProviderError>;
}

/// Builds a fresh [`ProviderRegistry`] handle.
///
/// Called once per request so that no registry state outlives a request.
pub trait ProviderFactory: Send + Sync + std::fmt::Debug {
    /// Creates a registry handle.
    fn build(&self) -> Arc<dyn ProviderRegistry>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_scraper_meta_round_trips_provider_shape() {
        let value = json!({
            "id": "vidsrc",
            "name": "VidSrc",
            "rank": 130,
            "type": "source",
            "mediaTypes": ["movie", "show"]
        });
        let meta: ScraperMeta = serde_json::from_value(value.clone()).unwrap();

        assert_eq!(meta.kind, ScraperKind::Source);
        assert_eq!(serde_json::to_value(&meta).unwrap(), value);
    }

    #[test]
    fn test_embed_descriptor_uses_camel_case() {
        let embed: EmbedDescriptor =
            serde_json::from_value(json!({ "embedId": "upcloud", "url": "https://e.example/1" }))
                .unwrap();
        assert_eq!(embed.embed_id, "upcloud");
    }

    #[test]
    fn test_embed_output_with_unknown_stream_type_still_decodes() {
        let output: EmbedScrapeOutput = serde_json::from_value(json!({ "stream": [
            { "type": "hls", "id": "p", "playlist": "https://c.example/m.m3u8" },
            { "type": "dash", "id": "d", "manifest": "https://c.example/m.mpd" }
        ] }))
        .unwrap();

        assert_eq!(output.stream.len(), 2);
        assert_eq!(output.stream[0].type_name(), "hls");
        assert_eq!(output.stream[1].type_name(), "dash");
    }

    #[test]
    fn test_run_output_keeps_unmodelled_fields() {
        let value = json!({
            "sourceId": "vidsrc",
            "embedId": "upcloud",
            "stream": {
                "type": "hls",
                "id": "p",
                "playlist": "https://c.example/m.m3u8",
                "flags": [],
                "captions": [],
                "thumbnailTrack": { "type": "vtt", "url": "https://c.example/t.vtt" }
            },
            "elapsedMs": 812
        });

        let output: RunOutput = serde_json::from_value(value.clone()).unwrap();

        assert_eq!(output.extra["elapsedMs"], 812);
        assert_eq!(serde_json::to_value(&output).unwrap(), value);
    }
}
