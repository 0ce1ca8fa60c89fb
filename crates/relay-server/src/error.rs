//! Error types for the relay server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use relay_translate::SchemaError;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// Errors that can occur while relaying a webhook.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(std::net::SocketAddr, std::io::Error),

    /// The request body is not valid JSON.
    #[error("invalid JSON body: {0}")]
    InvalidJson(String),

    /// The body is JSON but not a recognized Sentry payload.
    #[error(transparent)]
    InvalidPayload(#[from] SchemaError),

    /// No Google Chat webhook URL is configured.
    #[error("Google Chat webhook is not configured")]
    WebhookNotConfigured,

    /// The outbound request could not be completed.
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),

    /// Google Chat answered with a non-success status.
    #[error("Google Chat returned status {0}")]
    DeliveryRejected(u16),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl RelayError {
    /// Returns the HTTP status and error code for this error.
    #[must_use]
    pub const fn status(&self) -> (StatusCode, &'static str) {
        match self {
            Self::InvalidJson(_) | Self::InvalidPayload(_) => {
                (StatusCode::BAD_REQUEST, "invalid_payload")
            }
            Self::WebhookNotConfigured => (StatusCode::INTERNAL_SERVER_ERROR, "not_configured"),
            Self::DeliveryFailed(_) | Self::DeliveryRejected(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "delivery_failed")
            }
            Self::BindFailed(_, _) | Self::Serialization(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status();

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        let json = serde_json::to_string(&body).unwrap_or_else(|_| {
            r#"{"error":"internal_error","message":"failed to serialize error"}"#.to_string()
        });

        (status, [("content-type", "application/json")], json).into_response()
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        // The webhook URL carries the space key.
        Self::DeliveryFailed(err.without_url().to_string())
    }
}
