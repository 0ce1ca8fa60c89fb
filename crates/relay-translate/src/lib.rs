//! Sentry webhook to Google Chat message translation.
//!
//! `relay-translate` is the pure core of `sentry-relay`. It turns inbound
//! Sentry webhook JSON into a Google Chat webhook message and performs no
//! I/O.
//!
//! # Features
//!
//! - **Schema Adapters**: Normalize issue webhooks, alert-rule events and the
//!   legacy flat payload into one [`ErrorEvent`]
//! - **Action Filter**: Forward only newly created issues unless configured
//!   otherwise
//! - **Plain Text or Cards**: Render a compact text message or a card with
//!   key-value rows and a link button
//!
//! # Example
//!
//! ```rust
//! use relay_translate::{normalize_payload, ActionFilter, Translator, TranslatorConfig};
//! use serde_json::json;
//!
//! let config = TranslatorConfig::new(true, false);
//!
//! let payload = json!({
//!     "action": "created",
//!     "data": {
//!         "issue": {
//!             "shortId": "BACKEND-1A",
//!             "title": "ZeroDivisionError: division by zero",
//!             "level": "error",
//!             "web_url": "https://sentry.example.com/issues/1/",
//!             "project": { "name": "backend" }
//!         }
//!     }
//! });
//!
//! let inbound = normalize_payload(payload).unwrap();
//! assert!(ActionFilter::from_config(&config).decide(inbound.action.as_deref()).is_process());
//!
//! let message = Translator::new(config).translate(&inbound.event);
//! assert!(message.is_card());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod adapter;
pub mod error;
pub mod event;
pub mod filter;
pub mod message;
pub mod translate;

// Re-export main types at crate root
pub use adapter::{
    normalize_payload, EventAlertAdapter, InboundEvent, IssueWebhookAdapter, LegacyAdapter,
    SchemaAdapter, SchemaKind,
};
pub use error::{Result, SchemaError};
pub use event::{
    priority_marker, severity_marker, ErrorEvent, Level, Priority, Tag, UserIdentity,
};
pub use filter::{ActionFilter, Decision};
pub use message::{Button, Card, CardHeader, ChatMessage, KeyValue, Section, Widget};
pub use translate::{build_card, build_plain_text, Translator, TranslatorConfig};
