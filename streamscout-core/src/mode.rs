//! Runtime mode configuration for Streamscout.

use serde::{Deserialize, Serialize};

/// Runtime mode for Streamscout services.
///
/// Controls whether streams are scraped through the provider sidecar or served
/// from the offline demo catalogue. Both expose the same provider interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    /// Production mode - scrapes through the provider sidecar
    Production,
    /// Development mode - serves the demo catalogue without network access
    Development,
}

impl Default for RuntimeMode {
    fn default() -> Self {
        // Development needs no sidecar, so a bare `streamscout serve` works offline
        Self::Development
    }
}

impl std::fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Development => write!(f, "development"),
        }
    }
}

impl std::str::FromStr for RuntimeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            _ => Err(format!(
                "Invalid runtime mode: '{s}'. Valid options are: production, development"
            )),
        }
    }
}
