//! Relay server implementation.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::RelayConfig;
use crate::error::{RelayError, RelayResult};
use crate::routes::{create_router, WEBHOOK_PATH};
use crate::state::RelayState;

/// HTTP server relaying Sentry webhooks to Google Chat.
#[derive(Debug, Clone)]
pub struct RelayServer {
    state: Arc<RelayState>,
}

impl RelayServer {
    /// Create a relay server, choosing the sink from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the outbound HTTP client cannot be built.
    pub fn new(config: RelayConfig) -> RelayResult<Self> {
        Ok(Self::with_state(RelayState::from_config(config)?))
    }

    /// Create a relay server around prepared state.
    #[must_use]
    pub fn with_state(state: RelayState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Get the relay state.
    #[must_use]
    pub fn state(&self) -> Arc<RelayState> {
        self.state.clone()
    }

    /// Start the server on the configured address.
    ///
    /// This method runs until the server encounters a fatal error.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve(&self) -> RelayResult<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Start the server with graceful shutdown support.
    ///
    /// The server will shut down when the provided future completes.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve_with_shutdown<F>(&self, shutdown: F) -> RelayResult<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = self.state.config().bind_addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| RelayError::BindFailed(addr, e))?;

        self.log_startup(&listener);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RelayError::Internal(e.to_string()))?;

        info!("relay server shut down");
        Ok(())
    }

    /// Create the router without starting the server.
    pub fn router(&self) -> axum::Router {
        create_router(self.state.clone())
    }

    fn log_startup(&self, listener: &TcpListener) {
        let config = self.state.config();
        let addr = listener.local_addr().unwrap_or(config.bind_addr);
        let message_format = if config.translator.use_rich_cards {
            "cards"
        } else {
            "text"
        };

        info!(
            addr = %addr,
            format = message_format,
            all_actions = config.translator.process_all_actions,
            sink = self.state.sink_name().unwrap_or("none"),
            "relay server listening"
        );
        info!(
            webhook = WEBHOOK_PATH,
            health = "/health",
            status = "/",
            "endpoints available"
        );
    }
}
