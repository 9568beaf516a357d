//! Streamscout Core - Stream resolution orchestration
//!
//! Validates media queries, picks the source to scrape, resolves that source's
//! embeds in rank order and aggregates the surviving streams into a response.
//! The scraping itself is delegated to a [`ProviderRegistry`] collaborator.

pub mod aggregator;
pub mod config;
pub mod errors;
pub mod media;
pub mod mode;
pub mod provider;
pub mod resolver;
pub mod selection;
pub mod stream;
pub mod tracing_setup;
pub mod urls;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export main types for convenient access
pub use aggregator::{ResponseShape, StreamAggregator, StreamResponse, StreamResult};
pub use config::ScoutConfig;
pub use errors::{ConfigError, ProviderError, ScoutError, ValidationError};
pub use media::{EpisodeRef, MediaKind, MediaQuery, SeasonRef};
pub use mode::RuntimeMode;
pub use provider::{
    EmbedDescriptor, EmbedMeta, EmbedScrapeOutput, ProviderFactory, ProviderRegistry, RunOutput,
    ScraperKind, ScraperMeta, SourceDescriptor, SourceScrapeOutput,
};
pub use resolver::{EmbedAttempt, EmbedOutcome, EmbedResolver, ResolutionReport};
pub use stream::Stream;
pub use validation::{parse_media_query, validate_media_query};

pub type Result<T> = std::result::Result<T, ScoutError>;
