//! Scripted provider double for tests.
//!
//! Unconfigured scrapers report `NotFound`. Clones share their call log, so a
//! test can hand a clone to a factory and still inspect what happened.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::media::MediaQuery;
use crate::provider::{
    EmbedDescriptor, EmbedMeta, EmbedScrapeOutput, ProviderFactory, ProviderRegistry, RunOutput,
    ScraperKind, ScraperMeta, SourceDescriptor, SourceScrapeOutput,
};
use crate::stream::{FileStream, HlsStream, Stream, StreamFile};

/// Provider registry whose every answer is scripted up front.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProviders {
    sources: Vec<SourceDescriptor>,
    list_sources_failure: Option<String>,
    embed_metas: Vec<EmbedMeta>,
    source_results: HashMap<String, Result<SourceScrapeOutput, ProviderError>>,
    embed_results: HashMap<String, Result<EmbedScrapeOutput, ProviderError>>,
    run_all_result: Option<Result<Option<RunOutput>, ProviderError>>,
    calls: Arc<Mutex<Vec<String>>>,
    builds: Arc<AtomicUsize>,
}

impl ScriptedProviders {
    /// Creates a registry with no sources and no embeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Supported sources, ranked in descending order of appearance.
    pub fn with_sources(mut self, ids: &[&str]) -> Self {
        let count = ids.len() as i64;
        self.sources = ids
            .iter()
            .enumerate()
            .map(|(index, id)| ScraperMeta {
                id: id.to_string(),
                name: id.to_string(),
                rank: (count - index as i64) * 10,
                kind: ScraperKind::Source,
                media_types: None,
            })
            .collect();
        self
    }

    /// Makes `list_sources` fail.
    pub fn failing_list_sources(mut self, reason: &str) -> Self {
        self.list_sources_failure = Some(reason.to_string());
        self
    }

    /// Embed metadata as `(id, rank)` pairs.
    pub fn with_embed_metas(mut self, ranks: &[(&str, i64)]) -> Self {
        self.embed_metas = ranks.iter().map(|(id, rank)| embed_meta(id, *rank)).collect();
        self
    }

    /// Embeds found by scraping `source_id`, in scraper order.
    pub fn with_source_embeds(mut self, source_id: &str, embed_ids: &[&str]) -> Self {
        let embeds = embed_ids.iter().map(|id| embed(id)).collect();
        self.source_results
            .insert(source_id.to_string(), Ok(SourceScrapeOutput { embeds }));
        self
    }

    /// Scraping `source_id` finds nothing.
    pub fn with_source_not_found(mut self, source_id: &str) -> Self {
        self.source_results.insert(
            source_id.to_string(),
            Err(ProviderError::not_found(source_id)),
        );
        self
    }

    /// Scraping `source_id` fails.
    pub fn with_source_failure(mut self, source_id: &str, reason: &str) -> Self {
        self.source_results.insert(
            source_id.to_string(),
            Err(ProviderError::other(source_id, reason)),
        );
        self
    }

    /// Streams produced by resolving `embed_id`.
    pub fn with_embed_streams(mut self, embed_id: &str, streams: Vec<Stream>) -> Self {
        self.embed_results.insert(
            embed_id.to_string(),
            Ok(EmbedScrapeOutput { stream: streams }),
        );
        self
    }

    /// Resolving `embed_id` finds nothing.
    pub fn with_embed_not_found(mut self, embed_id: &str) -> Self {
        self.embed_results
            .insert(embed_id.to_string(), Err(ProviderError::not_found(embed_id)));
        self
    }

    /// Resolving `embed_id` fails.
    pub fn with_embed_failure(mut self, embed_id: &str, reason: &str) -> Self {
        self.embed_results.insert(
            embed_id.to_string(),
            Err(ProviderError::other(embed_id, reason)),
        );
        self
    }

    /// Outcome of `run_all`. Defaults to `Ok(None)`.
    pub fn with_run_all(mut self, result: Result<Option<RunOutput>, ProviderError>) -> Self {
        self.run_all_result = Some(result);
        self
    }

    /// Every operation invoked so far, e.g. `list_sources`, `source:alpha`, `embed:e1`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Embed ids resolved so far, in call order.
    pub fn embed_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| call.strip_prefix("embed:").map(str::to_string))
            .collect()
    }

    /// Number of registry handles built through [`ProviderFactory::build`].
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl ProviderRegistry for ScriptedProviders {
    async fn list_sources(&self) -> Result<Vec<SourceDescriptor>, ProviderError> {
        self.record("list_sources".to_string());
        match &self.list_sources_failure {
            Some(reason) => Err(ProviderError::other("listSources", reason.clone())),
            None => Ok(self.sources.clone()),
        }
    }

    async fn list_embeds(&self) -> Result<Vec<EmbedMeta>, ProviderError> {
        self.record("list_embeds".to_string());
        Ok(self.embed_metas.clone())
    }

    async fn run_source_scraper(
        &self,
        source_id: &str,
        _media: &MediaQuery,
    ) -> Result<SourceScrapeOutput, ProviderError> {
        self.record(format!("source:{source_id}"));
        self.source_results
            .get(source_id)
            .cloned()
            .unwrap_or_else(|| Err(ProviderError::not_found(source_id)))
    }

    async fn run_embed_scraper(
        &self,
        embed_id: &str,
        _url: &str,
    ) -> Result<EmbedScrapeOutput, ProviderError> {
        self.record(format!("embed:{embed_id}"));
        self.embed_results
            .get(embed_id)
            .cloned()
            .unwrap_or_else(|| Err(ProviderError::not_found(embed_id)))
    }

    async fn run_all(&self, _media: &MediaQuery) -> Result<Option<RunOutput>, ProviderError> {
        self.record("run_all".to_string());
        self.run_all_result.clone().unwrap_or(Ok(None))
    }
}

impl ProviderFactory for ScriptedProviders {
    fn build(&self) -> Arc<dyn ProviderRegistry> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        Arc::new(self.clone())
    }
}

/// Embed descriptor with a predictable URL.
pub fn embed(id: &str) -> EmbedDescriptor {
    EmbedDescriptor {
        embed_id: id.to_string(),
        url: format!("https://embed.example.com/{id}"),
    }
}

/// Embed scraper metadata with the given rank.
pub fn embed_meta(id: &str, rank: i64) -> EmbedMeta {
    ScraperMeta {
        id: id.to_string(),
        name: id.to_string(),
        rank,
        kind: ScraperKind::Embed,
        media_types: None,
    }
}

/// HLS stream with id `id`.
pub fn hls_stream(id: &str) -> Stream {
    Stream::Hls(HlsStream {
        id: id.to_string(),
        playlist: format!("https://cdn.example.com/{id}/master.m3u8"),
        flags: Vec::new(),
        captions: Vec::new(),
        headers: None,
        preferred_headers: None,
        extra: Default::default(),
    })
}

/// File stream with one mp4 per quality label.
pub fn file_stream(id: &str, qualities: &[&str]) -> Stream {
    Stream::File(FileStream {
        id: id.to_string(),
        flags: Vec::new(),
        qualities: qualities
            .iter()
            .map(|label| {
                (
                    label.to_string(),
                    StreamFile {
                        file_type: "mp4".to_string(),
                        url: format!("https://cdn.example.com/{id}/{label}.mp4"),
                    },
                )
            })
            .collect(),
        captions: Vec::new(),
        headers: None,
        preferred_headers: None,
        extra: Default::default(),
    })
}
