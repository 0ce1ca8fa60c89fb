//! Schema adapters for inbound Sentry webhooks.
//!
//! Sentry has delivered several payload shapes over time. Each adapter
//! recognizes one shape and normalizes it into the canonical [`ErrorEvent`]:
//!
//! - [`IssueWebhookAdapter`]: integration platform issue webhooks
//!   (`data.issue`), the canonical and richest schema
//! - [`EventAlertAdapter`]: alert rule notifications (`data.event`)
//! - [`LegacyAdapter`]: the flat legacy webhook (`project`, `event`, `user`),
//!   which accepts any other JSON object
//!
//! [`normalize_payload`] tries them richest first.

use std::fmt;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::event::{non_empty, ErrorEvent, Level, Priority, Tag, UserIdentity};

/// The upstream schema a payload was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaKind {
    /// Integration platform issue webhook.
    IssueWebhook,
    /// Alert rule event notification.
    EventAlert,
    /// Flat legacy webhook.
    Legacy,
}

impl SchemaKind {
    /// Returns the schema name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::IssueWebhook => "issue-webhook",
            Self::EventAlert => "event-alert",
            Self::Legacy => "legacy",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A normalized inbound webhook.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    /// The schema the payload was decoded from.
    pub schema: SchemaKind,
    /// Issue lifecycle action, if the schema carries one.
    pub action: Option<String>,
    /// The canonical event.
    pub event: ErrorEvent,
}

/// Converts one upstream payload shape into an [`InboundEvent`].
pub trait SchemaAdapter: Send + Sync + fmt::Debug {
    /// Returns the schema handled by this adapter.
    fn kind(&self) -> SchemaKind;

    /// Returns true if the payload has this schema's shape.
    fn matches(&self, payload: &Value) -> bool;

    /// Decodes and normalizes the payload.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Decode` if the payload fields have the wrong types.
    fn normalize(&self, payload: Value) -> Result<InboundEvent>;
}

/// Adapter for `data.issue` webhooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct IssueWebhookAdapter;

/// Adapter for `data.event` alert notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventAlertAdapter;

/// Adapter for the flat legacy payload. Matches any JSON object.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyAdapter;

static ADAPTERS: [&dyn SchemaAdapter; 3] = [&IssueWebhookAdapter, &EventAlertAdapter, &LegacyAdapter];

/// Normalizes a payload with the first adapter that recognizes it.
///
/// # Errors
///
/// Returns `SchemaError::Unrecognized` if the payload is not a JSON object, or
/// `SchemaError::Decode` if the matching adapter cannot decode it.
pub fn normalize_payload(payload: Value) -> Result<InboundEvent> {
    if !payload.is_object() {
        return Err(SchemaError::Unrecognized {
            reason: "payload is not a JSON object".to_string(),
        });
    }

    let adapter = ADAPTERS
        .iter()
        .find(|adapter| adapter.matches(&payload))
        .ok_or_else(|| SchemaError::Unrecognized {
            reason: "no schema adapter matched".to_string(),
        })?;

    debug!(schema = %adapter.kind(), "normalizing payload");
    adapter.normalize(payload)
}

// Issue webhook

#[derive(Debug, Deserialize)]
struct IssuePayload {
    #[serde(default)]
    action: Option<String>,
    data: IssueData,
}

#[derive(Debug, Deserialize)]
struct IssueData {
    issue: RawIssue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawIssue {
    #[serde(rename = "shortId")]
    short_id: Option<String>,
    title: Option<String>,
    culprit: Option<String>,
    level: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    platform: Option<String>,
    count: Value,
    #[serde(rename = "firstSeen")]
    first_seen: Value,
    #[serde(rename = "lastSeen")]
    last_seen: Value,
    web_url: Option<String>,
    permalink: Option<String>,
    project: Option<RawProject>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawProject {
    name: Option<String>,
    slug: Option<String>,
}

impl SchemaAdapter for IssueWebhookAdapter {
    fn kind(&self) -> SchemaKind {
        SchemaKind::IssueWebhook
    }

    fn matches(&self, payload: &Value) -> bool {
        payload.pointer("/data/issue").is_some_and(Value::is_object)
    }

    fn normalize(&self, payload: Value) -> Result<InboundEvent> {
        let raw: IssuePayload = decode(self.kind(), payload)?;
        let issue = raw.data.issue;

        let project = issue
            .project
            .and_then(|p| p.name.and_then(non_empty).or_else(|| p.slug.and_then(non_empty)))
            .unwrap_or_default();

        let event = ErrorEvent {
            project,
            title: issue.title.unwrap_or_default(),
            level: Level::parse(issue.level.as_deref().unwrap_or_default()),
            environment: None,
            culprit: issue.culprit.and_then(non_empty),
            url: first_present([issue.web_url, issue.permalink]),
            timestamp: parse_timestamp(&issue.last_seen),
            user: UserIdentity::default(),
            priority: issue.priority.and_then(non_empty).map(|p| Priority::parse(&p)),
            short_id: issue.short_id.and_then(non_empty),
            count: parse_count(&issue.count),
            status: issue.status.and_then(non_empty),
            first_seen: parse_timestamp(&issue.first_seen),
            platform: issue.platform.and_then(non_empty),
            tags: Vec::new(),
        };

        Ok(InboundEvent {
            schema: self.kind(),
            action: raw.action.and_then(non_empty),
            event,
        })
    }
}

// Event alert

#[derive(Debug, Deserialize)]
struct EventAlertPayload {
    data: EventAlertData,
}

#[derive(Debug, Deserialize)]
struct EventAlertData {
    event: RawEvent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawEvent {
    title: Option<String>,
    message: Option<String>,
    level: Option<String>,
    culprit: Option<String>,
    platform: Option<String>,
    environment: Option<String>,
    web_url: Option<String>,
    url: Option<String>,
    datetime: Value,
    timestamp: Value,
    user: Option<RawUser>,
    tags: Value,
    project_name: Option<String>,
    project: Value,
}

impl SchemaAdapter for EventAlertAdapter {
    fn kind(&self) -> SchemaKind {
        SchemaKind::EventAlert
    }

    fn matches(&self, payload: &Value) -> bool {
        payload.pointer("/data/event").is_some_and(Value::is_object)
    }

    fn normalize(&self, payload: Value) -> Result<InboundEvent> {
        let raw: EventAlertPayload = decode(self.kind(), payload)?;
        let ev = raw.data.event;

        let tags = parse_tags(&ev.tags);
        // Environment is usually only present as a tag on alert events.
        let environment = ev.environment.and_then(non_empty).or_else(|| {
            tags.iter()
                .find(|t| t.key == "environment")
                .and_then(|t| non_empty(t.value.clone()))
        });

        let project = ev
            .project_name
            .and_then(non_empty)
            .or_else(|| scalar_to_string(&ev.project))
            .unwrap_or_default();

        let event = ErrorEvent {
            project,
            title: first_present([ev.title, ev.message]),
            level: Level::parse(ev.level.as_deref().unwrap_or_default()),
            environment,
            culprit: ev.culprit.and_then(non_empty),
            url: first_present([ev.web_url, ev.url]),
            timestamp: parse_timestamp(&ev.datetime).or_else(|| parse_timestamp(&ev.timestamp)),
            user: ev.user.map(RawUser::into_identity).unwrap_or_default(),
            priority: None,
            short_id: None,
            count: None,
            status: None,
            first_seen: None,
            platform: ev.platform.and_then(non_empty),
            tags,
        };

        Ok(InboundEvent {
            schema: self.kind(),
            action: None,
            event,
        })
    }
}

// Legacy

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LegacyPayload {
    project: Option<String>,
    message: Option<String>,
    url: Option<String>,
    environment: Option<String>,
    timestamp: Value,
    culprit: Option<String>,
    event: LegacyEvent,
    user: Option<RawUser>,
    tags: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LegacyEvent {
    level: Option<String>,
    title: Option<String>,
    platform: Option<String>,
}

impl SchemaAdapter for LegacyAdapter {
    fn kind(&self) -> SchemaKind {
        SchemaKind::Legacy
    }

    fn matches(&self, payload: &Value) -> bool {
        payload.is_object()
    }

    fn normalize(&self, payload: Value) -> Result<InboundEvent> {
        let raw: LegacyPayload = decode(self.kind(), payload)?;

        let event = ErrorEvent {
            project: raw.project.unwrap_or_default(),
            title: first_present([raw.event.title, raw.message]),
            level: Level::parse(raw.event.level.as_deref().unwrap_or_default()),
            environment: raw.environment.and_then(non_empty),
            culprit: raw.culprit.and_then(non_empty),
            url: raw.url.unwrap_or_default(),
            timestamp: parse_timestamp(&raw.timestamp),
            user: raw.user.map(RawUser::into_identity).unwrap_or_default(),
            priority: None,
            short_id: None,
            count: None,
            status: None,
            first_seen: None,
            platform: raw.event.platform.and_then(non_empty),
            tags: parse_tags(&raw.tags),
        };

        Ok(InboundEvent {
            schema: self.kind(),
            action: None,
            event,
        })
    }
}

// Shared helpers

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawUser {
    id: Value,
    username: Option<String>,
    email: Option<String>,
}

impl RawUser {
    fn into_identity(self) -> UserIdentity {
        UserIdentity {
            id: scalar_to_string(&self.id),
            username: self.username.and_then(non_empty),
            email: self.email.and_then(non_empty),
        }
    }
}

fn decode<T: DeserializeOwned>(schema: SchemaKind, payload: Value) -> Result<T> {
    serde_json::from_value(payload).map_err(|e| SchemaError::decode(schema, &e))
}

fn first_present<const N: usize>(candidates: [Option<String>; N]) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
        .unwrap_or_default()
}

/// Reads a string or number as a non-empty string.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads an occurrence count sent either as a number or a numeric string.
fn parse_count(value: &Value) -> Option<u64> {
    let count = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    (count > 0).then_some(count)
}

/// Reads an RFC 3339 string or a Unix epoch in seconds.
///
/// The zero time `0001-01-01T00:00:00Z` emitted for unset timestamps is
/// treated as absent.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
            .filter(|dt| dt.year() > 1),
        Value::Number(n) => {
            let secs = n.as_f64()?;
            let nanos = (secs.fract() * 1e9) as u32;
            Utc.timestamp_opt(secs.trunc() as i64, nanos).single()
        }
        _ => None,
    }
}

/// Reads tags as `[{"key": k, "value": v}]` or `[[k, v]]`.
fn parse_tags(value: &Value) -> Vec<Tag> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(obj) => {
                let key = obj.get("key")?.as_str()?;
                let value = obj.get("value").and_then(scalar_to_string).unwrap_or_default();
                Some(Tag::new(key, value))
            }
            Value::Array(pair) => {
                let key = pair.first()?.as_str()?;
                let value = pair.get(1).and_then(scalar_to_string).unwrap_or_default();
                Some(Tag::new(key, value))
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issue_payload(action: &str) -> Value {
        json!({
            "action": action,
            "installation": { "uuid": "7a485448-a9e2-4c85-8a3c-4f44175783c9" },
            "data": {
                "issue": {
                    "id": "1170820242",
                    "shortId": "BACKEND-1A",
                    "title": "ZeroDivisionError: division by zero",
                    "culprit": "app.views.divide",
                    "level": "error",
                    "status": "unresolved",
                    "priority": "high",
                    "platform": "python",
                    "count": "12",
                    "firstSeen": "2024-03-01T08:00:00.000000Z",
                    "lastSeen": "2024-03-05T14:07:09.123456Z",
                    "web_url": "https://sentry.example.com/organizations/acme/issues/1170820242/",
                    "permalink": null,
                    "project": { "id": "2", "name": "backend", "slug": "backend-slug" }
                }
            },
            "actor": { "type": "application", "id": "sentry", "name": "Sentry" }
        })
    }

    fn event_alert_payload() -> Value {
        json!({
            "action": "triggered",
            "data": {
                "event": {
                    "event_id": "ec8b2ad8d3b84b1f9fce9a4d2a3b1f46",
                    "project": 2,
                    "title": "TypeError: undefined is not a function",
                    "level": "warning",
                    "culprit": "main.js in handler",
                    "platform": "javascript",
                    "datetime": "2024-03-05T14:07:09Z",
                    "web_url": "https://sentry.example.com/organizations/acme/issues/9/events/ec8b/",
                    "user": { "id": 42, "email": "a@x.com" },
                    "tags": [["environment", "staging"], ["browser", "Chrome 120"]]
                },
                "triggered_rule": "Notify on new errors"
            }
        })
    }

    fn legacy_payload() -> Value {
        json!({
            "project": "frontend",
            "message": "fallback message",
            "url": "https://sentry.example.com/frontend/issues/3/",
            "environment": "production",
            "timestamp": "2024-03-05T14:07:09Z",
            "culprit": "",
            "event": { "event_id": "abc", "level": "FATAL", "title": "Out of memory", "platform": "node" },
            "user": { "username": "alice", "email": "" },
            "tags": [{ "key": "release", "value": "1.2.3" }]
        })
    }

    mod detection_tests {
        use super::*;

        #[test]
        fn issue_schema_detected() {
            let inbound = normalize_payload(issue_payload("created")).unwrap();
            assert_eq!(inbound.schema, SchemaKind::IssueWebhook);
        }

        #[test]
        fn event_alert_schema_detected() {
            let inbound = normalize_payload(event_alert_payload()).unwrap();
            assert_eq!(inbound.schema, SchemaKind::EventAlert);
        }

        #[test]
        fn legacy_schema_detected() {
            let inbound = normalize_payload(legacy_payload()).unwrap();
            assert_eq!(inbound.schema, SchemaKind::Legacy);
        }

        #[test]
        fn issue_schema_preferred_over_legacy_shape() {
            let mut payload = issue_payload("created");
            payload["project"] = json!("legacy-project");

            let inbound = normalize_payload(payload).unwrap();
            assert_eq!(inbound.schema, SchemaKind::IssueWebhook);
            assert_eq!(inbound.event.project, "backend");
        }

        #[test]
        fn non_object_is_unrecognized() {
            let err = normalize_payload(json!([1, 2, 3])).unwrap_err();
            assert!(matches!(err, SchemaError::Unrecognized { .. }));
        }

        #[test]
        fn unknown_object_falls_back_to_legacy() {
            let inbound = normalize_payload(json!({ "message": "x", "url": "u" })).unwrap();

            assert_eq!(inbound.schema, SchemaKind::Legacy);
            assert_eq!(inbound.event.title, "x");
            assert_eq!(inbound.event.url, "u");
            assert_eq!(inbound.event.level, Level::Unknown);
        }

        #[test]
        fn empty_object_is_legacy() {
            let inbound = normalize_payload(json!({})).unwrap();

            assert_eq!(inbound.schema, SchemaKind::Legacy);
            assert!(inbound.action.is_none());
            assert!(inbound.event.title.is_empty());
        }

        #[test]
        fn legacy_wrong_field_type_is_decode_error() {
            let err = normalize_payload(json!({ "project": 5 })).unwrap_err();

            assert!(matches!(
                err,
                SchemaError::Decode {
                    schema: SchemaKind::Legacy,
                    ..
                }
            ));
        }

        #[test]
        fn wrong_field_type_is_decode_error() {
            let payload = json!({ "data": { "issue": { "title": 12 } } });
            let err = normalize_payload(payload).unwrap_err();

            assert!(matches!(
                err,
                SchemaError::Decode {
                    schema: SchemaKind::IssueWebhook,
                    ..
                }
            ));
        }
    }

    mod issue_tests {
        use super::*;

        #[test]
        fn normalizes_all_fields() {
            let inbound = normalize_payload(issue_payload("created")).unwrap();
            let event = inbound.event;

            assert_eq!(inbound.action.as_deref(), Some("created"));
            assert_eq!(event.project, "backend");
            assert_eq!(event.title, "ZeroDivisionError: division by zero");
            assert_eq!(event.level, Level::Error);
            assert_eq!(event.culprit.as_deref(), Some("app.views.divide"));
            assert_eq!(event.short_id.as_deref(), Some("BACKEND-1A"));
            assert_eq!(event.status.as_deref(), Some("unresolved"));
            assert_eq!(event.priority, Some(Priority::High));
            assert_eq!(event.platform.as_deref(), Some("python"));
            assert_eq!(event.count, Some(12));
            assert_eq!(
                event.url,
                "https://sentry.example.com/organizations/acme/issues/1170820242/"
            );
            assert_eq!(
                event.first_seen,
                Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap())
            );
            assert!(event.timestamp.is_some());
            assert!(!event.user.is_present());
        }

        #[test]
        fn numeric_count_and_slug_fallback() {
            let payload = json!({
                "action": "resolved",
                "data": { "issue": { "title": "t", "count": 5, "project": { "name": "", "slug": "web" } } }
            });
            let inbound = normalize_payload(payload).unwrap();

            assert_eq!(inbound.action.as_deref(), Some("resolved"));
            assert_eq!(inbound.event.count, Some(5));
            assert_eq!(inbound.event.project, "web");
        }

        #[test]
        fn zero_count_and_empty_priority_are_absent() {
            let payload = json!({
                "data": { "issue": { "title": "t", "count": "0", "priority": "" } }
            });
            let event = normalize_payload(payload).unwrap().event;

            assert!(event.count.is_none());
            assert!(event.priority.is_none());
            assert_eq!(event.level, Level::Unknown);
        }

        #[test]
        fn unrecognized_priority_is_kept_as_unknown() {
            let payload = json!({ "data": { "issue": { "priority": "urgent" } } });
            let event = normalize_payload(payload).unwrap().event;

            assert_eq!(event.priority, Some(Priority::Unknown));
        }

        #[test]
        fn permalink_used_when_web_url_missing() {
            let payload = json!({
                "data": { "issue": { "permalink": "https://sentry.example.com/share/1/" } }
            });
            let event = normalize_payload(payload).unwrap().event;

            assert_eq!(event.url, "https://sentry.example.com/share/1/");
        }
    }

    mod event_alert_tests {
        use super::*;

        #[test]
        fn normalizes_fields() {
            let inbound = normalize_payload(event_alert_payload()).unwrap();
            let event = inbound.event;

            assert!(inbound.action.is_none());
            assert_eq!(event.project, "2");
            assert_eq!(event.title, "TypeError: undefined is not a function");
            assert_eq!(event.level, Level::Warning);
            assert_eq!(event.environment.as_deref(), Some("staging"));
            assert_eq!(event.culprit.as_deref(), Some("main.js in handler"));
            assert_eq!(event.platform.as_deref(), Some("javascript"));
            assert_eq!(event.user.id.as_deref(), Some("42"));
            assert_eq!(event.user.display(), "a@x.com");
            assert_eq!(event.tags.len(), 2);
            assert_eq!(event.tags[1], Tag::new("browser", "Chrome 120"));
            assert_eq!(
                event.timestamp,
                Some(Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap())
            );
        }

        #[test]
        fn epoch_timestamp_and_message_fallback() {
            let payload = json!({
                "data": { "event": { "message": "boom", "timestamp": 1_709_647_629.5, "project_name": "api" } }
            });
            let event = normalize_payload(payload).unwrap().event;

            assert_eq!(event.title, "boom");
            assert_eq!(event.project, "api");
            assert_eq!(
                event.timestamp.map(|t| t.timestamp()),
                Some(1_709_647_629)
            );
        }
    }

    mod legacy_tests {
        use super::*;

        #[test]
        fn normalizes_fields() {
            let event = normalize_payload(legacy_payload()).unwrap().event;

            assert_eq!(event.project, "frontend");
            assert_eq!(event.title, "Out of memory");
            assert_eq!(event.level, Level::Fatal);
            assert_eq!(event.environment.as_deref(), Some("production"));
            assert!(event.culprit.is_none());
            assert_eq!(event.user.username.as_deref(), Some("alice"));
            assert!(event.user.email.is_none());
            assert_eq!(event.platform.as_deref(), Some("node"));
            assert_eq!(event.tags, vec![Tag::new("release", "1.2.3")]);
            assert_eq!(event.url, "https://sentry.example.com/frontend/issues/3/");
        }

        #[test]
        fn unparseable_timestamp_is_dropped() {
            let payload = json!({ "project": "p", "timestamp": "not a time" });
            let event = normalize_payload(payload).unwrap().event;

            assert!(event.timestamp.is_none());
        }

        #[test]
        fn zero_time_is_absent() {
            let payload = json!({ "project": "p", "timestamp": "0001-01-01T00:00:00Z" });
            let event = normalize_payload(payload).unwrap().event;

            assert!(event.timestamp.is_none());
        }

        #[test]
        fn title_falls_back_to_message() {
            let payload = json!({ "project": "p", "message": "something broke" });
            let event = normalize_payload(payload).unwrap().event;

            assert_eq!(event.title, "something broke");
            assert_eq!(event.level, Level::Unknown);
        }
    }
}
