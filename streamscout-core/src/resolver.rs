//! Embed resolution for a single source.
//!
//! A source scrape yields embeds; each embed is resolved into at most one
//! stream, strictly one after another in rank order. A failing embed never
//! fails the request.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::errors::ProviderError;
use crate::media::MediaQuery;
use crate::provider::{EmbedDescriptor, EmbedMeta, ProviderRegistry};
use crate::stream::Stream;

/// What happened when one embed was resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbedOutcome {
    /// The embed produced a usable stream.
    Resolved(Stream),
    /// The first stream was a file stream with only an `unknown` quality.
    Filtered,
    /// The embed scraper found nothing.
    NotFound,
    /// The embed scraper succeeded without producing any stream.
    Empty,
    /// The embed scraper failed.
    Failed(ProviderError),
}

/// One embed resolution attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedAttempt {
    pub embed_id: String,
    pub url: String,
    pub outcome: EmbedOutcome,
}

/// Every attempt made while resolving one source, in resolution order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionReport {
    pub source_id: String,
    pub attempts: Vec<EmbedAttempt>,
}

impl ResolutionReport {
    fn empty(source_id: &str) -> Self {
        Self {
            source_id: source_id.to_string(),
            attempts: Vec::new(),
        }
    }

    /// Resolved streams in resolution order.
    pub fn streams(&self) -> impl Iterator<Item = &Stream> {
        self.attempts.iter().filter_map(|attempt| match &attempt.outcome {
            EmbedOutcome::Resolved(stream) => Some(stream),
            _ => None,
        })
    }

    /// Consumes the report, keeping only the resolved streams.
    pub fn into_streams(self) -> Vec<Stream> {
        self.attempts
            .into_iter()
            .filter_map(|attempt| match attempt.outcome {
                EmbedOutcome::Resolved(stream) => Some(stream),
                _ => None,
            })
            .collect()
    }

    /// Counts attempts whose outcome matches `predicate`.
    pub fn count(&self, predicate: impl Fn(&EmbedOutcome) -> bool) -> usize {
        self.attempts
            .iter()
            .filter(|attempt| predicate(&attempt.outcome))
            .count()
    }
}

/// Sorts embeds ascending by rank; embeds without a rank sort after all
/// ranked ones. The sort is stable.
pub fn sort_embeds_by_rank(
    mut embeds: Vec<EmbedDescriptor>,
    embed_metas: &[EmbedMeta],
) -> Vec<EmbedDescriptor> {
    let ranks: HashMap<&str, i64> = embed_metas
        .iter()
        .map(|meta| (meta.id.as_str(), meta.rank))
        .collect();

    embeds.sort_by(|a, b| {
        match (
            ranks.get(a.embed_id.as_str()),
            ranks.get(b.embed_id.as_str()),
        ) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(rank_a), Some(rank_b)) => rank_a.cmp(rank_b),
        }
    });
    embeds
}

/// Order in which embeds are resolved: the ascending rank sort, reversed.
///
/// This is not "descending rank, unranked last": the reversal moves unranked
/// embeds to the front. Kept as observed until product decides otherwise.
pub fn resolution_order(
    embeds: Vec<EmbedDescriptor>,
    embed_metas: &[EmbedMeta],
) -> Vec<EmbedDescriptor> {
    let mut ordered = sort_embeds_by_rank(embeds, embed_metas);
    ordered.reverse();
    ordered
}

/// Resolves the embeds of one source through a provider registry.
#[derive(Debug, Clone, Copy)]
pub struct EmbedResolver<'a> {
    providers: &'a dyn ProviderRegistry,
}

impl<'a> EmbedResolver<'a> {
    /// Creates a resolver backed by `providers`.
    pub fn new(providers: &'a dyn ProviderRegistry) -> Self {
        Self { providers }
    }

    /// Scrapes `source_id` and resolves its embeds in rank order.
    ///
    /// A source that finds nothing yields an empty report.
    ///
    /// # Errors
    /// - `ProviderError::Other` - The source scraper or embed listing failed
    pub async fn resolve(
        &self,
        source_id: &str,
        media: &MediaQuery,
    ) -> Result<ResolutionReport, ProviderError> {
        let scraped = match self.providers.run_source_scraper(source_id, media).await {
            Ok(output) => output,
            Err(error) if error.is_not_found() => {
                debug!(source_id, %media, "Source found nothing");
                return Ok(ResolutionReport::empty(source_id));
            }
            Err(error) => return Err(error),
        };

        let embed_metas = self.providers.list_embeds().await?;
        let ordered = resolution_order(scraped.embeds, &embed_metas);
        debug!(
            source_id,
            embeds = ordered.len(),
            "Resolving embeds in rank order"
        );

        let mut attempts = Vec::with_capacity(ordered.len());
        for embed in ordered {
            let outcome = self.resolve_embed(&embed).await;
            attempts.push(EmbedAttempt {
                embed_id: embed.embed_id,
                url: embed.url,
                outcome,
            });
        }

        let report = ResolutionReport {
            source_id: source_id.to_string(),
            attempts,
        };
        info!(
            source_id,
            resolved = report.count(|o| matches!(o, EmbedOutcome::Resolved(_))),
            filtered = report.count(|o| matches!(o, EmbedOutcome::Filtered)),
            not_found = report.count(|o| matches!(o, EmbedOutcome::NotFound)),
            failed = report.count(|o| matches!(o, EmbedOutcome::Failed(_) | EmbedOutcome::Empty)),
            "Source resolution finished"
        );
        Ok(report)
    }

    async fn resolve_embed(&self, embed: &EmbedDescriptor) -> EmbedOutcome {
        let output = match self
            .providers
            .run_embed_scraper(&embed.embed_id, &embed.url)
            .await
        {
            Ok(output) => output,
            Err(error) if error.is_not_found() => return EmbedOutcome::NotFound,
            Err(error) => {
                warn!(embed_id = %embed.embed_id, url = %embed.url, %error, "Embed scraper failed");
                return EmbedOutcome::Failed(error);
            }
        };

        // Only the first stream of an embed is considered.
        match output.stream.into_iter().next() {
            None => {
                warn!(embed_id = %embed.embed_id, "Embed scraper returned no streams");
                EmbedOutcome::Empty
            }
            Some(stream) if stream.has_only_unknown_quality() => {
                debug!(embed_id = %embed.embed_id, "Dropping stream with unknown quality only");
                EmbedOutcome::Filtered
            }
            Some(stream) => EmbedOutcome::Resolved(stream),
        }
    }
}
