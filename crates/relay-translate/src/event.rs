//! Canonical error-event model.
//!
//! Every upstream payload shape is normalized into an [`ErrorEvent`] before
//! translation:
//! - [`Level`]: the severity of the event
//! - [`Priority`]: the triage ranking of the issue
//! - [`UserIdentity`]: the user affected by the event
//! - [`Tag`]: a key-value tag attached to the event

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker shown for fatal and error events.
pub const ALERT_MARKER: &str = "🚨";
/// Marker shown for warnings.
pub const CAUTION_MARKER: &str = "⚠️";
/// Marker shown for informational events.
pub const INFO_MARKER: &str = "ℹ️";
/// Marker shown for debug events.
pub const BUG_MARKER: &str = "🐛";
/// Marker shown when the level is not recognized.
pub const GENERIC_MARKER: &str = "📋";

/// Sentinel used when no identity field is available.
pub const IDENTITY_NOT_AVAILABLE: &str = "not available";

/// The severity level of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// The process crashed.
    Fatal,
    /// An error was captured.
    Error,
    /// Something unexpected, but recoverable.
    Warning,
    /// Informational message.
    Info,
    /// Debug output.
    Debug,
    /// Missing or unrecognized level.
    #[default]
    Unknown,
}

impl Level {
    /// Classifies a raw level string.
    ///
    /// Matching is case-insensitive and never fails: anything that is not a
    /// known level becomes [`Level::Unknown`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fatal" => Self::Fatal,
            "error" => Self::Error,
            "warning" => Self::Warning,
            "info" => Self::Info,
            "debug" => Self::Debug,
            _ => Self::Unknown,
        }
    }

    /// Returns the level as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fatal => "fatal",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Unknown => "unknown",
        }
    }

    /// Returns the display marker for this level.
    #[must_use]
    pub const fn marker(&self) -> &'static str {
        match self {
            Self::Fatal | Self::Error => ALERT_MARKER,
            Self::Warning => CAUTION_MARKER,
            Self::Info => INFO_MARKER,
            Self::Debug => BUG_MARKER,
            Self::Unknown => GENERIC_MARKER,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns the display marker for a raw level string.
#[must_use]
pub fn severity_marker(raw: &str) -> &'static str {
    Level::parse(raw).marker()
}

/// The triage priority of an issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Needs attention now.
    High,
    /// Needs attention soon.
    Medium,
    /// Can wait.
    Low,
    /// Missing or unrecognized priority.
    #[default]
    Unknown,
}

impl Priority {
    /// Classifies a raw priority string. Case-insensitive and total.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Unknown,
        }
    }

    /// Returns the priority as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Unknown => "unknown",
        }
    }

    /// Returns the display marker for this priority.
    #[must_use]
    pub const fn marker(&self) -> &'static str {
        match self {
            Self::High => "🔴",
            Self::Medium => "🟡",
            Self::Low => "🟢",
            Self::Unknown => "⚪",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns the display marker for a raw priority string.
#[must_use]
pub fn priority_marker(raw: &str) -> &'static str {
    Priority::parse(raw).marker()
}

/// The user affected by an event. Any subset of fields may be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Opaque user ID.
    pub id: Option<String>,
    /// Username.
    pub username: Option<String>,
    /// Email address.
    pub email: Option<String>,
}

impl UserIdentity {
    /// Returns true if at least one identity field is set.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.id.is_some() || self.username.is_some() || self.email.is_some()
    }

    /// Formats the most human-readable identity available.
    ///
    /// Order: `username (email)`, email, username, `ID: <id>`, then
    /// [`IDENTITY_NOT_AVAILABLE`].
    #[must_use]
    pub fn display(&self) -> String {
        match (&self.username, &self.email, &self.id) {
            (Some(username), Some(email), _) => format!("{username} ({email})"),
            (None, Some(email), _) => email.clone(),
            (Some(username), None, _) => username.clone(),
            (None, None, Some(id)) => format!("ID: {id}"),
            (None, None, None) => IDENTITY_NOT_AVAILABLE.to_string(),
        }
    }
}

/// A key-value tag attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name.
    pub key: String,
    /// Tag value.
    pub value: String,
}

impl Tag {
    /// Creates a new tag.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A single error-tracking record, normalized from any upstream schema.
///
/// Optional text fields are never `Some("")`: adapters collapse empty
/// strings to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorEvent {
    /// Project name.
    pub project: String,
    /// Event title.
    pub title: String,
    /// Severity level.
    pub level: Level,
    /// Deployment environment.
    pub environment: Option<String>,
    /// Source location that produced the event.
    pub culprit: Option<String>,
    /// Link to the full event in the tracker.
    pub url: String,
    /// When the event was last seen.
    pub timestamp: Option<DateTime<Utc>>,
    /// Affected user.
    pub user: UserIdentity,
    /// Triage priority.
    pub priority: Option<Priority>,
    /// Short issue identifier such as `BACKEND-1A`.
    pub short_id: Option<String>,
    /// Number of occurrences. Never `Some(0)`.
    pub count: Option<u64>,
    /// Issue status.
    pub status: Option<String>,
    /// When the issue was first seen.
    pub first_seen: Option<DateTime<Utc>>,
    /// SDK platform.
    pub platform: Option<String>,
    /// Tags attached to the event.
    pub tags: Vec<Tag>,
}

impl ErrorEvent {
    /// Creates an event with the required fields set.
    #[must_use]
    pub fn new(project: impl Into<String>, title: impl Into<String>, level: Level) -> Self {
        Self {
            project: project.into(),
            title: title.into(),
            level,
            ..Self::default()
        }
    }

    /// Sets the detail URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the environment.
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = non_empty(environment.into());
        self
    }

    /// Sets the culprit.
    #[must_use]
    pub fn with_culprit(mut self, culprit: impl Into<String>) -> Self {
        self.culprit = non_empty(culprit.into());
        self
    }

    /// Sets the user identity. Empty fields are dropped.
    #[must_use]
    pub fn with_user(mut self, user: UserIdentity) -> Self {
        self.user = UserIdentity {
            id: user.id.and_then(non_empty),
            username: user.username.and_then(non_empty),
            email: user.email.and_then(non_empty),
        };
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the occurrence count. Zero clears it.
    #[must_use]
    pub const fn with_count(mut self, count: u64) -> Self {
        self.count = if count == 0 { None } else { Some(count) };
        self
    }

    /// Sets the last-seen timestamp.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(key, value));
        self
    }
}

/// Collapses an empty or whitespace-only string to `None`.
pub(crate) fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
