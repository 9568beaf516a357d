//! Error-to-HTTP response conversion.
//!
//! Client mistakes become 400 with a plain-text message. Scrape failures
//! never reach this point; the aggregator already turned them into empty
//! results.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use streamscout_core::{ProviderError, ScoutError, ValidationError};
use thiserror::Error;

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Validation or source-selection failure.
    #[error(transparent)]
    Scout(#[from] ScoutError),

    /// The provider could not list its sources.
    #[error("Failed to list sources")]
    SourcesUnavailable(#[source] ProviderError),
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        Self::Scout(ScoutError::Validation(error))
    }
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Scout(error) if error.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Scout(_) | ApiError::SourcesUnavailable(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(status = %status, error = ?self, "Provider failure in API handler");
        } else {
            tracing::debug!(status = %status, error = %self, "Rejected request");
        }

        (status, self.to_string()).into_response()
    }
}
