//! Streamscout Providers - Provider collaborator implementations

#![deny(missing_docs)]
#![deny(clippy::missing_errors_doc)]
#![warn(clippy::too_many_lines)]
//!
//! The scraping of streaming sites lives outside this service. Production
//! talks to a provider sidecar over HTTP; development serves a small offline
//! catalogue through the same [`ProviderRegistry`] interface.
//!
//! [`ProviderRegistry`]: streamscout_core::ProviderRegistry

pub mod bridge;
pub mod demo;

use std::sync::Arc;

use streamscout_core::{ConfigError, ProviderFactory, RuntimeMode, ScoutConfig};

// Re-export main types
pub use bridge::{HttpBridgeFactory, HttpProviderBridge};
pub use demo::{DemoFactory, DemoProviders};

/// Creates the provider factory matching the configured runtime mode.
///
/// # Errors
/// - `ConfigError::InvalidProviderUrl` - Production mode with an unusable sidecar URL
/// - `ConfigError::InvalidValue` - HTTP client could not be built
pub fn factory_for(config: &ScoutConfig) -> Result<Arc<dyn ProviderFactory>, ConfigError> {
    match config.runtime_mode {
        RuntimeMode::Production => {
            let bridge = HttpProviderBridge::new(&config.provider)?;
            tracing::info!(base_url = %bridge.base_url(), "Using provider sidecar");
            Ok(Arc::new(HttpBridgeFactory::new(bridge)))
        }
        RuntimeMode::Development => {
            tracing::info!("Using demo provider catalogue");
            Ok(Arc::new(DemoFactory))
        }
    }
}
