//! Error types for stream resolution.
//!
//! Validation and source-selection errors are terminal for a request. Provider
//! errors are absorbed by the resolver and never fail a request on their own.

use thiserror::Error;

/// A media query failed validation.
///
/// Only the first failing field is reported. The message is written for the
/// client and always names the field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Dotted path of the failing field, e.g. `season.number`
    pub field: String,
    /// Human-readable message naming the field
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error for `field`.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failure reported by a provider collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The upstream scraper ran but found nothing.
    #[error("Nothing found by {scraper}")]
    NotFound {
        /// Identifier of the source or embed scraper
        scraper: String,
    },

    /// Any other upstream failure (network, parsing, scraper crash).
    #[error("Scraper {scraper} failed: {reason}")]
    Other {
        /// Identifier of the scraper or operation that failed
        scraper: String,
        /// The reason for the failure
        reason: String,
    },
}

impl ProviderError {
    /// Creates a not-found error for `scraper`.
    pub fn not_found(scraper: impl Into<String>) -> Self {
        Self::NotFound {
            scraper: scraper.into(),
        }
    }

    /// Creates a generic failure for `scraper`.
    pub fn other(scraper: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Other {
            scraper: scraper.into(),
            reason: reason.into(),
        }
    }

    /// Checks if the upstream simply found nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors that terminate a stream request.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// The request payload is malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The requested source is not among the currently supported sources.
    #[error("Invalid source")]
    InvalidSource {
        /// The identifier the client asked for
        source_id: String,
    },

    /// A provider failure that could not be absorbed.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl ScoutError {
    /// Checks if this error is caused by client input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidSource { .. })
    }
}

/// Configuration could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The provider bridge URL is not an http(s) URL.
    #[error("Invalid provider URL: {url}")]
    InvalidProviderUrl {
        /// The rejected URL
        url: String,
    },

    /// A setting has an unusable value.
    #[error("Invalid value for {setting}: {reason}")]
    InvalidValue {
        /// Name of the setting
        setting: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_displays_message_only() {
        let error = ValidationError::new("title", "title is required");
        assert_eq!(error.to_string(), "title is required");
        assert_eq!(error.field, "title");
    }

    #[test]
    fn test_invalid_source_message_is_fixed() {
        let error = ScoutError::InvalidSource {
            source_id: "bogus".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid source");
        assert!(error.is_client_error());
    }

    #[test]
    fn test_provider_error_is_not_client_error() {
        let error = ScoutError::from(ProviderError::other("runAll", "boom"));
        assert!(!error.is_client_error());
        assert!(!ProviderError::other("x", "y").is_not_found());
        assert!(ProviderError::not_found("x").is_not_found());
    }
}
