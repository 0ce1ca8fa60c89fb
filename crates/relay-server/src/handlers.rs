//! HTTP request handlers for the relay.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::{RelayError, RelayResult};
use crate::state::{RelayOutcome, RelayState};

/// Banner returned by `GET /`.
pub const SERVICE_BANNER: &str = "Sentry to Google Chat relay - running";

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status message.
    pub status: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
}

/// Handle GET /health - health check endpoint.
pub async fn health_check(State(state): State<Arc<RelayState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.uptime_secs(),
    })
}

/// Handle GET / - service banner.
pub async fn index() -> &'static str {
    SERVICE_BANNER
}

/// Handle POST /sentry-webhook - translate and forward a Sentry webhook.
///
/// The body is decoded here rather than with the `Json` extractor so that
/// malformed JSON and a missing content type both map to `400`.
pub async fn relay_webhook(
    State(state): State<Arc<RelayState>>,
    body: Bytes,
) -> RelayResult<(StatusCode, &'static str)> {
    let span = info_span!("sentry_webhook", request_id = %Uuid::new_v4());

    async move {
        let payload: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
            warn!(error = %e, "failed to decode payload");
            RelayError::InvalidJson(e.to_string())
        })?;

        match state.relay(payload).await? {
            RelayOutcome::Delivered(_) => Ok((StatusCode::OK, "OK")),
            RelayOutcome::Ignored { .. } => Ok((StatusCode::OK, "ignored")),
        }
    }
    .instrument(span)
    .await
}
