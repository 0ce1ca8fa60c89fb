//! Shared state for the relay server.

use std::sync::Arc;
use std::time::Instant;

use relay_translate::{normalize_payload, ActionFilter, Decision, Translator};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::config::RelayConfig;
use crate::error::{RelayError, RelayResult};
use crate::sink::{ChatSink, DeliveryReceipt, LogSink, WebhookSink};

/// What happened to an inbound webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The message was translated and delivered.
    Delivered(DeliveryReceipt),
    /// The issue action was filtered out; nothing was sent.
    Ignored {
        /// The filtered action.
        action: String,
    },
}

/// Shared state for the relay server. Read-only after startup.
#[derive(Debug)]
pub struct RelayState {
    /// Relay configuration.
    config: RelayConfig,
    /// Message builder.
    translator: Translator,
    /// Issue action gate.
    filter: ActionFilter,
    /// Delivery target, if configured.
    sink: Option<Arc<dyn ChatSink>>,
    /// Server start time.
    start_time: Instant,
}

impl RelayState {
    /// Create relay state with an explicit sink.
    pub fn new(config: RelayConfig, sink: Option<Arc<dyn ChatSink>>) -> Self {
        Self {
            translator: Translator::new(config.translator),
            filter: ActionFilter::from_config(&config.translator),
            config,
            sink,
            start_time: Instant::now(),
        }
    }

    /// Create relay state, choosing the sink from the configuration.
    ///
    /// Dry runs log messages; otherwise the webhook URL is used. Without a
    /// URL the relay still starts but every delivery fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: RelayConfig) -> RelayResult<Self> {
        let sink: Option<Arc<dyn ChatSink>> = if config.dry_run {
            Some(Arc::new(LogSink::default()))
        } else if let Some(url) = &config.webhook_url {
            Some(Arc::new(WebhookSink::new(url, config.delivery_timeout)?))
        } else {
            warn!("GCHAT_WEBHOOK is not set, deliveries will fail");
            None
        };

        Ok(Self::new(config, sink))
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Get the configured sink name.
    #[must_use]
    pub fn sink_name(&self) -> Option<&str> {
        self.sink.as_deref().map(|sink| sink.name())
    }

    /// Get server uptime in seconds.
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Normalize, filter, translate and deliver one webhook payload.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::InvalidPayload` for unrecognized payloads, and
    /// the delivery errors of the sink.
    pub async fn relay(&self, payload: Value) -> RelayResult<RelayOutcome> {
        let inbound = normalize_payload(payload)?;

        info!(
            schema = %inbound.schema,
            action = inbound.action.as_deref().unwrap_or("-"),
            project = %inbound.event.project,
            level = %inbound.event.level,
            title = %inbound.event.title,
            "webhook received"
        );

        if let Decision::Skip { action } = self.filter.decide(inbound.action.as_deref()) {
            info!(action = %action, "action filtered, not forwarding");
            return Ok(RelayOutcome::Ignored { action });
        }

        let message = self.translator.translate(&inbound.event);

        let Some(sink) = &self.sink else {
            error!("cannot deliver message, webhook is not configured");
            return Err(RelayError::WebhookNotConfigured);
        };

        match sink.deliver(&message).await {
            Ok(receipt) => Ok(RelayOutcome::Delivered(receipt)),
            Err(e) => {
                error!(sink = %sink.name(), error = %e, "delivery failed");
                Err(e)
            }
        }
    }
}
