//! Google Chat webhook message schema.
//!
//! A [`ChatMessage`] is either plain text or a list of cards. The enum is
//! serialized untagged, so the JSON body carries exactly one of `text` or
//! `cards`.

use serde::{Deserialize, Serialize};

/// A message accepted by a Google Chat incoming webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatMessage {
    /// Plain-text message.
    Text {
        /// The message body.
        text: String,
    },
    /// Card message.
    Cards {
        /// The cards to render.
        cards: Vec<Card>,
    },
}

impl ChatMessage {
    /// Creates a plain-text message.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Creates a message holding a single card.
    #[must_use]
    pub fn card(card: Card) -> Self {
        Self::Cards { cards: vec![card] }
    }

    /// Returns true for card messages.
    #[must_use]
    pub const fn is_card(&self) -> bool {
        matches!(self, Self::Cards { .. })
    }

    /// Returns the text body, if this is a plain-text message.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Cards { .. } => None,
        }
    }

    /// Returns the cards, if this is a card message.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        match self {
            Self::Text { .. } => &[],
            Self::Cards { cards } => cards,
        }
    }
}

/// A card with a header and sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Card header.
    pub header: CardHeader,
    /// Card sections.
    pub sections: Vec<Section>,
}

/// Title area of a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardHeader {
    /// Header title.
    pub title: String,
    /// Header subtitle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Header image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A group of widgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Widgets in display order.
    pub widgets: Vec<Widget>,
}

/// A single card row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Widget {
    /// Labelled value row.
    KeyValue {
        /// The row content.
        #[serde(rename = "keyValue")]
        key_value: KeyValue,
    },
    /// Row of buttons.
    Buttons {
        /// The buttons.
        buttons: Vec<Button>,
    },
}

impl Widget {
    /// Creates a key-value widget.
    #[must_use]
    pub const fn key_value(key_value: KeyValue) -> Self {
        Self::KeyValue { key_value }
    }

    /// Creates a widget with one link button.
    #[must_use]
    pub fn link_button(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Buttons {
            buttons: vec![Button::link(text, url)],
        }
    }

    /// Returns the key-value content, if any.
    #[must_use]
    pub const fn as_key_value(&self) -> Option<&KeyValue> {
        match self {
            Self::KeyValue { key_value } => Some(key_value),
            Self::Buttons { .. } => None,
        }
    }
}

/// A labelled value with an optional icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValue {
    /// Label above the content.
    pub top_label: String,
    /// The value.
    pub content: String,
    /// Whether the content may wrap.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub content_multiline: bool,
    /// Label below the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom_label: Option<String>,
    /// Built-in icon name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl KeyValue {
    /// Creates a row with a label and content.
    #[must_use]
    pub fn new(top_label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            top_label: top_label.into(),
            content: content.into(),
            content_multiline: false,
            bottom_label: None,
            icon: None,
        }
    }

    /// Sets the icon.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Allows the content to wrap.
    #[must_use]
    pub const fn multiline(mut self) -> Self {
        self.content_multiline = true;
        self
    }

    /// Sets the bottom label.
    #[must_use]
    pub fn with_bottom_label(mut self, label: impl Into<String>) -> Self {
        self.bottom_label = Some(label.into());
        self
    }
}

/// A button widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Button {
    /// Text button content.
    pub text_button: TextButton,
}

impl Button {
    /// Creates a text button that opens `url`.
    #[must_use]
    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text_button: TextButton {
                text: text.into(),
                on_click: OnClick {
                    open_link: OpenLink { url: url.into() },
                },
            },
        }
    }
}

/// A button rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextButton {
    /// Button label.
    pub text: String,
    /// Click action.
    pub on_click: OnClick,
}

/// Click action of a button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnClick {
    /// Link to open.
    pub open_link: OpenLink,
}

/// A link target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenLink {
    /// Target URL.
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_message_serializes_only_text() {
        let value = serde_json::to_value(ChatMessage::text("hello")).unwrap();

        assert_eq!(value, json!({ "text": "hello" }));
    }

    #[test]
    fn card_message_serializes_only_cards() {
        let card = Card {
            header: CardHeader {
                title: "title".to_string(),
                subtitle: None,
                image_url: None,
            },
            sections: vec![Section {
                widgets: vec![Widget::key_value(KeyValue::new("Project", "api"))],
            }],
        };
        let value = serde_json::to_value(ChatMessage::card(card)).unwrap();

        assert!(value.get("text").is_none());
        assert_eq!(
            value,
            json!({
                "cards": [{
                    "header": { "title": "title" },
                    "sections": [{
                        "widgets": [{ "keyValue": { "topLabel": "Project", "content": "api" } }]
                    }]
                }]
            })
        );
    }

    #[test]
    fn key_value_optional_fields_are_emitted_when_set() {
        let kv = KeyValue::new("Origin", "app.views")
            .with_icon("DESCRIPTION")
            .with_bottom_label("culprit")
            .multiline();
        let value = serde_json::to_value(&kv).unwrap();

        assert_eq!(value["icon"], "DESCRIPTION");
        assert_eq!(value["bottomLabel"], "culprit");
        assert_eq!(value["contentMultiline"], true);
    }

    #[test]
    fn button_uses_open_link_action() {
        let value = serde_json::to_value(Widget::link_button("Open", "https://x")).unwrap();

        assert_eq!(
            value,
            json!({
                "buttons": [{
                    "textButton": { "text": "Open", "onClick": { "openLink": { "url": "https://x" } } }
                }]
            })
        );
    }

    #[test]
    fn untagged_message_parses_both_shapes() {
        let text: ChatMessage = serde_json::from_value(json!({ "text": "hi" })).unwrap();
        assert_eq!(text.as_text(), Some("hi"));
        assert!(text.cards().is_empty());

        let cards: ChatMessage = serde_json::from_value(json!({ "cards": [] })).unwrap();
        assert!(cards.is_card());
        assert!(cards.as_text().is_none());
    }
}
