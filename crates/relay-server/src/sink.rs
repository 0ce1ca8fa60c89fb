//! Delivery sinks for translated messages.
//!
//! This module provides the [`ChatSink`] trait and its implementations:
//! [`WebhookSink`] posts to a Google Chat incoming webhook, [`LogSink`]
//! only logs the message. Delivery is attempted once; there are no retries.

use std::fmt;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use relay_translate::ChatMessage;
use tracing::{debug, error, info};

use crate::error::{RelayError, RelayResult};

/// Outcome of a successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// The sink that delivered the message.
    pub sink: String,
    /// Response status code (if applicable).
    pub status_code: Option<u16>,
}

impl DeliveryReceipt {
    /// Creates a receipt for the named sink.
    #[must_use]
    pub fn new(sink: impl Into<String>) -> Self {
        Self {
            sink: sink.into(),
            status_code: None,
        }
    }

    /// Sets the status code.
    #[must_use]
    pub const fn with_status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }
}

/// Destination for translated chat messages.
pub trait ChatSink: Send + Sync + fmt::Debug {
    /// Returns the name of this sink.
    fn name(&self) -> &str;

    /// Delivers a message.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::DeliveryFailed` on transport errors and
    /// `RelayError::DeliveryRejected` on non-success responses.
    fn deliver<'a>(&'a self, message: &'a ChatMessage) -> BoxFuture<'a, RelayResult<DeliveryReceipt>>;
}

/// Posts messages to a Google Chat incoming webhook.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    url: String,
    client: reqwest::Client,
}

impl WebhookSink {
    /// Creates a webhook sink with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Internal` if the URL is empty or the HTTP client
    /// cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> RelayResult<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(RelayError::Internal("webhook URL cannot be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { url, client })
    }
}

impl ChatSink for WebhookSink {
    fn name(&self) -> &str {
        "google-chat"
    }

    fn deliver<'a>(&'a self, message: &'a ChatMessage) -> BoxFuture<'a, RelayResult<DeliveryReceipt>> {
        async move {
            let response = self.client.post(&self.url).json(message).send().await?;
            let status = response.status();

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                error!(
                    sink = %self.name(),
                    status = status.as_u16(),
                    body = %body,
                    "webhook rejected message"
                );
                return Err(RelayError::DeliveryRejected(status.as_u16()));
            }

            info!(sink = %self.name(), status = status.as_u16(), "message delivered");
            Ok(DeliveryReceipt::new(self.name()).with_status_code(status.as_u16()))
        }
        .boxed()
    }
}

/// A sink that logs messages instead of sending them.
#[derive(Debug, Clone)]
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Creates a new log sink.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new("log")
    }
}

impl ChatSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn deliver<'a>(&'a self, message: &'a ChatMessage) -> BoxFuture<'a, RelayResult<DeliveryReceipt>> {
        async move {
            let payload = serde_json::to_string(message)?;
            info!(sink = %self.name, cards = message.is_card(), "dry run, message not sent");
            debug!(payload = %payload, "chat payload");
            Ok(DeliveryReceipt::new(self.name.clone()))
        }
        .boxed()
    }
}


#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};

    use super::*;

    type Received = Arc<Mutex<Vec<serde_json::Value>>>;

    /// Starts a fake Google Chat endpoint answering with `status`.
    async fn fake_chat(status: StatusCode) -> (SocketAddr, Received) {
        let received: Received = Arc::default();
        let app = Router::new()
            .route(
                "/v1/spaces/test/messages",
                post(
                    move |State(store): State<Received>, Json(body): Json<serde_json::Value>| async move {
                        store.lock().unwrap().push(body);
                        status
                    },
                ),
            )
            .with_state(received.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        (addr, received)
    }

    #[test]
    fn test_receipt_builder() {
        let receipt = DeliveryReceipt::new("google-chat").with_status_code(200);

        assert_eq!(receipt.sink, "google-chat");
        assert_eq!(receipt.status_code, Some(200));
    }

    #[test]
    fn test_webhook_sink_rejects_empty_url() {
        let result = WebhookSink::new("", Duration::from_secs(1));

        assert!(matches!(result, Err(RelayError::Internal(_))));
    }

    #[tokio::test]
    async fn test_webhook_sink_posts_json() {
        let (addr, received) = fake_chat(StatusCode::OK).await;
        let sink =
            WebhookSink::new(format!("http://{addr}/v1/spaces/test/messages"), Duration::from_secs(5))
                .unwrap();

        let receipt = sink.deliver(&ChatMessage::text("hello")).await.unwrap();

        assert_eq!(receipt.status_code, Some(200));
        let bodies = received.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0], serde_json::json!({ "text": "hello" }));
    }

    #[tokio::test]
    async fn test_webhook_sink_maps_error_status() {
        let (addr, _received) = fake_chat(StatusCode::FORBIDDEN).await;
        let sink =
            WebhookSink::new(format!("http://{addr}/v1/spaces/test/messages"), Duration::from_secs(5))
                .unwrap();

        let err = sink.deliver(&ChatMessage::text("hello")).await.unwrap_err();

        assert!(matches!(err, RelayError::DeliveryRejected(403)));
    }

    #[tokio::test]
    async fn test_webhook_sink_transport_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let sink = WebhookSink::new(format!("http://{addr}/"), Duration::from_secs(2)).unwrap();
        let err = sink.deliver(&ChatMessage::text("hello")).await.unwrap_err();

        assert!(matches!(err, RelayError::DeliveryFailed(_)));
    }

    #[tokio::test]
    async fn test_log_sink_always_succeeds() {
        let sink = LogSink::default();
        let receipt = sink.deliver(&ChatMessage::text("hello")).await.unwrap();

        assert_eq!(receipt.sink, "log");
        assert!(receipt.status_code.is_none());
    }
}
