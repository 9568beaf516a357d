//! Stream aggregation: turns resolver and provider output into responses.
//!
//! Scrape-stage failures never escape from here. Only an unknown source
//! identifier is reported back to the caller as an error.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::errors::{ProviderError, ScoutError};
use crate::media::MediaQuery;
use crate::provider::{ProviderRegistry, RunOutput};
use crate::resolver::EmbedResolver;
use crate::selection::{ResolutionPath, select_source};
use crate::stream::Stream;

/// Normalized stream response envelope.
///
/// `source_id` is `None` when nothing was found across all sources or when
/// resolution failed unexpectedly. A named source always echoes its id, even
/// with no streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamResult {
    pub source_id: Option<String>,
    pub streams: Vec<Stream>,
}

impl StreamResult {
    /// Envelope for "no result found".
    pub fn none() -> Self {
        Self {
            source_id: None,
            streams: Vec::new(),
        }
    }

    /// Envelope for streams of one source.
    pub fn from_source(source_id: impl Into<String>, streams: Vec<Stream>) -> Self {
        Self {
            source_id: Some(source_id.into()),
            streams,
        }
    }

    /// Wraps the provider's best all-sources outcome.
    pub fn from_run_output(output: Option<RunOutput>) -> Self {
        match output {
            Some(output) => Self::from_source(output.source_id, vec![output.stream]),
            None => Self::none(),
        }
    }
}

/// Response shape for all-sources resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseShape {
    /// `{ sourceId, streams }` envelope
    #[default]
    Normalized,
    /// Provider output passed through as-is, `null` when absent
    Raw,
}

impl std::fmt::Display for ResponseShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normalized => write!(f, "normalized"),
            Self::Raw => write!(f, "raw"),
        }
    }
}

impl std::str::FromStr for ResponseShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normalized" => Ok(Self::Normalized),
            "raw" => Ok(Self::Raw),
            _ => Err(format!(
                "Invalid response shape: '{s}'. Valid options are: normalized, raw"
            )),
        }
    }
}

/// Body of a successful stream request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StreamResponse {
    Normalized(StreamResult),
    Raw(Option<RunOutput>),
}

impl StreamResponse {
    fn all_sources(output: Option<RunOutput>, shape: ResponseShape) -> Self {
        match shape {
            ResponseShape::Normalized => Self::Normalized(StreamResult::from_run_output(output)),
            ResponseShape::Raw => Self::Raw(output),
        }
    }

    fn nothing_found(shape: ResponseShape) -> Self {
        Self::all_sources(None, shape)
    }
}

/// Single entry point for stream requests against one provider registry.
#[derive(Debug, Clone, Copy)]
pub struct StreamAggregator<'a> {
    providers: &'a dyn ProviderRegistry,
}

impl<'a> StreamAggregator<'a> {
    /// Creates an aggregator backed by `providers`.
    pub fn new(providers: &'a dyn ProviderRegistry) -> Self {
        Self { providers }
    }

    /// Resolves streams for `media`, from `source_id` or from all sources.
    ///
    /// `shape` applies to all-sources resolution only; a named source always
    /// produces the normalized envelope.
    ///
    /// # Errors
    /// - `ScoutError::InvalidSource` - `source_id` is not currently supported
    pub async fn resolve(
        &self,
        source_id: Option<&str>,
        media: &MediaQuery,
        shape: ResponseShape,
    ) -> Result<StreamResponse, ScoutError> {
        let path = match select_source(self.providers, source_id).await {
            Ok(path) => path,
            Err(ScoutError::Provider(failure)) => {
                log_failure("listSources", &failure);
                return Ok(StreamResponse::Normalized(StreamResult::none()));
            }
            Err(other) => return Err(other),
        };

        Ok(match path {
            ResolutionPath::AllSources => self.resolve_all(media, shape).await,
            ResolutionPath::SingleSource(source) => {
                StreamResponse::Normalized(self.resolve_source(&source.id, media).await)
            }
        })
    }

    /// Resolves every embed of one already-verified source.
    pub async fn resolve_source(&self, source_id: &str, media: &MediaQuery) -> StreamResult {
        match EmbedResolver::new(self.providers)
            .resolve(source_id, media)
            .await
        {
            Ok(report) => StreamResult::from_source(source_id, report.into_streams()),
            Err(failure) => {
                log_failure(source_id, &failure);
                StreamResult::none()
            }
        }
    }

    /// Delegates to the provider's all-sources resolution.
    pub async fn resolve_all(&self, media: &MediaQuery, shape: ResponseShape) -> StreamResponse {
        match self.providers.run_all(media).await {
            Ok(output) => {
                debug!(
                    %media,
                    source_id = ?output.as_ref().map(|o| o.source_id.as_str()),
                    "All-sources resolution finished"
                );
                StreamResponse::all_sources(output, shape)
            }
            Err(failure) => {
                log_failure("runAll", &failure);
                StreamResponse::nothing_found(shape)
            }
        }
    }
}

fn log_failure(operation: &str, failure: &ProviderError) {
    if !failure.is_not_found() {
        error!(operation, error = %failure, "Stream resolution failed, answering with no streams");
    }
}
