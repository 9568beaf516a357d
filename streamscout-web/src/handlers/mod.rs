//! HTTP request handlers organized by functionality

pub mod api;

// Re-export handler functions
pub use api::{api_sources, api_streams, api_streams_for_source, api_streams_named_sources, health};
