//! Centralized configuration for Streamscout.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::time::Duration;

use crate::aggregator::ResponseShape;
use crate::errors::ConfigError;
use crate::mode::RuntimeMode;
use crate::urls::is_valid_http_url;

/// Central configuration for all Streamscout components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct ScoutConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub streams: StreamsConfig,
    pub runtime_mode: RuntimeMode,
}

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Upper bound on a whole request, scraping included
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Provider bridge configuration.
///
/// Only used in production mode, where scraping is delegated over HTTP.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the provider-scraping sidecar
    pub base_url: String,
    /// Timeout for a single provider call
    pub call_timeout: Duration,
    /// User agent sent to the sidecar
    pub user_agent: &'static str,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5100".to_string(),
            call_timeout: Duration::from_secs(30),
            user_agent: "streamscout/0.1.0",
        }
    }
}

/// Stream response settings.
#[derive(Debug, Clone, Default)]
pub struct StreamsConfig {
    /// Shape of `POST /api/streams` responses (no source given)
    pub all_sources_shape: ResponseShape,
}

impl ScoutConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration using `lookup` to read overrides.
    ///
    /// Values that fail to parse are ignored and the default is kept.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(host) = lookup("STREAMSCOUT_HOST") {
            config.server.host = host;
        }

        if let Some(port) = lookup("STREAMSCOUT_PORT").and_then(|p| p.parse().ok()) {
            config.server.port = port;
        }

        if let Some(seconds) =
            lookup("STREAMSCOUT_REQUEST_TIMEOUT").and_then(|t| t.parse::<u64>().ok())
        {
            config.server.request_timeout = Duration::from_secs(seconds);
        }

        if let Some(url) = lookup("STREAMSCOUT_PROVIDER_URL") {
            config.provider.base_url = url;
        }

        if let Some(seconds) =
            lookup("STREAMSCOUT_PROVIDER_TIMEOUT").and_then(|t| t.parse::<u64>().ok())
        {
            config.provider.call_timeout = Duration::from_secs(seconds);
        }

        if let Some(shape) =
            lookup("STREAMSCOUT_ALL_SOURCES_SHAPE").and_then(|s| s.parse().ok())
        {
            config.streams.all_sources_shape = shape;
        }

        if let Some(mode) = lookup("STREAMSCOUT_MODE").and_then(|m| m.parse().ok()) {
            config.runtime_mode = mode;
        }

        config
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    /// - `ConfigError::InvalidProviderUrl` - Provider URL is not http(s)
    /// - `ConfigError::InvalidValue` - A timeout is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_http_url(&self.provider.base_url) {
            return Err(ConfigError::InvalidProviderUrl {
                url: self.provider.base_url.clone(),
            });
        }

        if self.server.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                setting: "request_timeout",
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.provider.call_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                setting: "provider call_timeout",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Socket address string for the listener, e.g. `0.0.0.0:5000`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Creates a configuration optimized for testing.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                request_timeout: Duration::from_secs(5),
            },
            provider: ProviderConfig {
                call_timeout: Duration::from_secs(5),
                ..Default::default()
            },
            runtime_mode: RuntimeMode::Development,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config_values() {
        let config = ScoutConfig::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.request_timeout, Duration::from_secs(60));
        assert_eq!(config.provider.base_url, "http://127.0.0.1:5100");
        assert_eq!(config.provider.call_timeout, Duration::from_secs(30));
        assert_eq!(config.streams.all_sources_shape, ResponseShape::Normalized);
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = ScoutConfig::from_lookup(lookup_from(&[
            ("STREAMSCOUT_HOST", "127.0.0.1"),
            ("STREAMSCOUT_PORT", "8080"),
            ("STREAMSCOUT_REQUEST_TIMEOUT", "15"),
            ("STREAMSCOUT_PROVIDER_URL", "https://providers.internal"),
            ("STREAMSCOUT_PROVIDER_TIMEOUT", "10"),
            ("STREAMSCOUT_ALL_SOURCES_SHAPE", "raw"),
            ("STREAMSCOUT_MODE", "production"),
        ]));

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.server.request_timeout, Duration::from_secs(15));
        assert_eq!(config.provider.base_url, "https://providers.internal");
        assert_eq!(config.provider.call_timeout, Duration::from_secs(10));
        assert_eq!(config.streams.all_sources_shape, ResponseShape::Raw);
        assert_eq!(config.runtime_mode, RuntimeMode::Production);
    }

    #[test]
    fn test_unparseable_overrides_are_ignored() {
        let config = ScoutConfig::from_lookup(lookup_from(&[
            ("STREAMSCOUT_PORT", "eighty"),
            ("STREAMSCOUT_ALL_SOURCES_SHAPE", "sideways"),
            ("STREAMSCOUT_MODE", "staging"),
        ]));

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.streams.all_sources_shape, ResponseShape::Normalized);
        assert_eq!(config.runtime_mode, RuntimeMode::default());
    }

    #[test]
    fn test_validate_rejects_bad_provider_url() {
        let mut config = ScoutConfig::default();
        config.provider.base_url = "providers:5100".to_string();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProviderUrl { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = ScoutConfig::default();
        config.server.request_timeout = Duration::ZERO;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { setting: "request_timeout", .. })
        ));
    }

    #[test]
    fn test_testing_config_uses_development_mode() {
        let config = ScoutConfig::for_testing();
        assert_eq!(config.runtime_mode, RuntimeMode::Development);
        assert!(config.validate().is_ok());
    }
}
