//! Route configuration for the relay.

use std::sync::Arc;

use axum::routing::{get, post, Router};
use tower_http::trace::TraceLayer;

use crate::handlers::{health_check, index, relay_webhook};
use crate::state::RelayState;

/// Path Sentry posts webhooks to.
pub const WEBHOOK_PATH: &str = "/sentry-webhook";

/// Create the relay router.
pub fn create_router(state: Arc<RelayState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route(WEBHOOK_PATH, post(relay_webhook))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
