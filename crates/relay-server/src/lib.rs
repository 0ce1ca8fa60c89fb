//! # relay-server
//!
//! HTTP relay that receives Sentry webhooks and forwards them to a Google
//! Chat space, built on the axum HTTP framework.
//!
//! Payload decoding and message building live in `relay-translate`; this
//! crate owns the HTTP surface, configuration and outbound delivery.
//!
//! ## Example
//!
//! ```rust,no_run
//! use relay_server::{RelayConfig, RelayServer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = RelayConfig::default()
//!         .with_webhook_url("https://chat.googleapis.com/v1/spaces/AAA/messages?key=k")
//!         .with_rich_cards(true);
//!
//!     let server = RelayServer::new(config).unwrap();
//!     // server.serve().await.unwrap();
//! }
//! ```
//!
//! ## Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/sentry-webhook` | POST | Translate and forward a Sentry webhook |
//! | `/health` | GET | Liveness probe with uptime |
//! | `/` | GET | Plain-text service banner |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod sink;
pub mod state;

// Re-export main types
pub use config::RelayConfig;
pub use error::{RelayError, RelayResult};
pub use server::RelayServer;
pub use sink::{ChatSink, DeliveryReceipt, LogSink, WebhookSink};
pub use state::{RelayOutcome, RelayState};
