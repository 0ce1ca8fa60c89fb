//! Error event to chat message translation.
//!
//! [`Translator`] renders an [`ErrorEvent`] either as a plain-text message or
//! as a single card. Both renderings are pure and infallible: absent fields
//! are left out, unknown levels and priorities fall back to default markers.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::ErrorEvent;
use crate::message::{Card, CardHeader, ChatMessage, KeyValue, Section, Widget};

/// Format used for timestamps in rendered messages.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Label of the terminal card button.
pub const VIEW_BUTTON_TEXT: &str = "View in Sentry";

/// Translation settings, supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Render cards instead of plain text.
    pub use_rich_cards: bool,
    /// Forward every issue action, not only `created`.
    pub process_all_actions: bool,
}

impl TranslatorConfig {
    /// Creates a configuration.
    #[must_use]
    pub const fn new(use_rich_cards: bool, process_all_actions: bool) -> Self {
        Self {
            use_rich_cards,
            process_all_actions,
        }
    }
}

/// Builds chat messages from error events.
#[derive(Debug, Clone, Copy, Default)]
pub struct Translator {
    config: TranslatorConfig,
}

impl Translator {
    /// Creates a translator with the given configuration.
    #[must_use]
    pub const fn new(config: TranslatorConfig) -> Self {
        Self { config }
    }

    /// Translates an event into the configured message format.
    #[must_use]
    pub fn translate(&self, event: &ErrorEvent) -> ChatMessage {
        debug!(
            project = %event.project,
            level = %event.level,
            cards = self.config.use_rich_cards,
            "translating event"
        );

        if self.config.use_rich_cards {
            build_card(event)
        } else {
            ChatMessage::text(build_plain_text(event))
        }
    }
}

/// Renders an event as a plain-text message body.
///
/// The detail URL is always the last line.
#[must_use]
pub fn build_plain_text(event: &ErrorEvent) -> String {
    let marker = event.level.marker();
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{marker} *Sentry Alert* - *{}* {marker}\n", event.project);
    let _ = writeln!(out, "⚠️ {}", event.title);
    let _ = writeln!(out, "*Level:* {}", event.level.as_str().to_uppercase());

    if let Some(environment) = &event.environment {
        let _ = writeln!(out, "*Environment:* {environment}");
    }
    if let Some(culprit) = &event.culprit {
        let _ = writeln!(out, "*Origin:* {culprit}");
    }
    if let Some(priority) = event.priority {
        let _ = writeln!(
            out,
            "*Priority:* {} {}",
            priority.marker(),
            priority.as_str().to_uppercase()
        );
    }
    if let Some(platform) = &event.platform {
        let _ = writeln!(out, "*Platform:* {platform}");
    }
    if let Some(count) = event.count {
        let _ = writeln!(out, "*Occurrences:* {count}");
    }
    if let Some(status) = &event.status {
        let _ = writeln!(out, "*Status:* {status}");
    }
    if let Some(first_seen) = event.first_seen {
        let _ = writeln!(out, "*First seen:* {}", format_timestamp(first_seen));
    }
    if event.user.is_present() {
        let _ = writeln!(out, "*User:* {}", event.user.display());
    }

    let _ = write!(out, "\n{}", event.url);
    out
}

/// Renders an event as a card message.
///
/// Rows appear in a fixed order and are left out when their source field is
/// absent; the last widget is always the link button.
#[must_use]
pub fn build_card(event: &ErrorEvent) -> ChatMessage {
    let mut rows: Vec<KeyValue> = Vec::new();

    if let Some(short_id) = &event.short_id {
        rows.push(KeyValue::new("Issue", short_id).with_icon("TICKET"));
    }
    rows.push(KeyValue::new("Project", &event.project).with_icon("BOOKMARK"));
    rows.push(KeyValue::new("Level", event.level.as_str().to_uppercase()).with_icon("ERROR"));
    if let Some(environment) = &event.environment {
        rows.push(KeyValue::new("Environment", environment).with_icon("STAR"));
    }
    if let Some(priority) = event.priority {
        rows.push(KeyValue::new(
            "Priority",
            format!("{} {}", priority.marker(), priority.as_str().to_uppercase()),
        ));
    }
    if let Some(platform) = &event.platform {
        rows.push(KeyValue::new("Platform", platform).with_icon("DESCRIPTION"));
    }
    if let Some(culprit) = &event.culprit {
        rows.push(
            KeyValue::new("Origin", culprit)
                .with_icon("DESCRIPTION")
                .multiline(),
        );
    }
    if event.user.is_present() {
        rows.push(KeyValue::new("User", event.user.display()).with_icon("PERSON"));
    }
    if let Some(count) = event.count {
        rows.push(KeyValue::new("Occurrences", count.to_string()).with_icon("MULTIPLE_PEOPLE"));
    }
    if let Some(status) = &event.status {
        rows.push(KeyValue::new("Status", status));
    }
    if let Some(timestamp) = event.timestamp {
        rows.push(KeyValue::new("Timestamp", format_timestamp(timestamp)).with_icon("CLOCK"));
    }
    if let Some(first_seen) = event.first_seen {
        rows.push(KeyValue::new("First seen", format_timestamp(first_seen)).with_icon("CLOCK"));
    }

    let mut widgets: Vec<Widget> = rows.into_iter().map(Widget::key_value).collect();
    widgets.push(Widget::link_button(VIEW_BUTTON_TEXT, &event.url));

    ChatMessage::card(Card {
        header: CardHeader {
            title: format!("{} Sentry Alert", event.level.marker()),
            subtitle: Some(event.title.clone()),
            image_url: None,
        },
        sections: vec![Section { widgets }],
    })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}
