//! Source selection: one named source, or let the provider try them all.

use tracing::debug;

use crate::errors::ScoutError;
use crate::provider::{ProviderRegistry, SourceDescriptor};

/// How a stream request will be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionPath {
    /// Delegate to the provider's aggregate resolution.
    AllSources,
    /// Resolve embeds of one verified source.
    SingleSource(SourceDescriptor),
}

/// Decides the resolution path for an optional source identifier.
///
/// The supported-source list is fetched on every call: the provider may add or
/// drop sources while this process keeps running.
///
/// # Errors
/// - `ScoutError::InvalidSource` - `source_id` is not currently supported
/// - `ScoutError::Provider` - The source list could not be fetched
pub async fn select_source(
    providers: &dyn ProviderRegistry,
    source_id: Option<&str>,
) -> Result<ResolutionPath, ScoutError> {
    let Some(source_id) = source_id else {
        return Ok(ResolutionPath::AllSources);
    };

    let sources = providers.list_sources().await?;
    find_source(sources, source_id)
        .map(ResolutionPath::SingleSource)
        .ok_or_else(|| {
            debug!(source_id, "Requested source is not supported");
            ScoutError::InvalidSource {
                source_id: source_id.to_string(),
            }
        })
}

fn find_source(sources: Vec<SourceDescriptor>, source_id: &str) -> Option<SourceDescriptor> {
    sources.into_iter().find(|source| source.id == source_id)
}
