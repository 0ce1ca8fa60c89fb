//! Error types for the relay-translate crate.

use thiserror::Error;

use crate::adapter::SchemaKind;

/// Errors raised while normalizing an inbound payload.
///
/// Translation itself cannot fail; only recognizing and decoding the
/// upstream JSON can.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The payload matches none of the known webhook schemas.
    #[error("unrecognized payload: {reason}")]
    Unrecognized {
        /// Why no schema matched.
        reason: String,
    },

    /// The payload looked like a known schema but could not be decoded.
    #[error("invalid {schema} payload: {reason}")]
    Decode {
        /// The schema that was attempted.
        schema: SchemaKind,
        /// The decoder message.
        reason: String,
    },
}

impl SchemaError {
    pub(crate) fn decode(schema: SchemaKind, err: &serde_json::Error) -> Self {
        Self::Decode {
            schema,
            reason: err.to_string(),
        }
    }
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_unrecognized() {
        let err = SchemaError::Unrecognized {
            reason: "payload is not an object".to_string(),
        };
        assert_eq!(err.to_string(), "unrecognized payload: payload is not an object");
    }

    #[test]
    fn error_display_decode() {
        let json_err = serde_json::from_str::<u64>("\"x\"").unwrap_err();
        let err = SchemaError::decode(SchemaKind::IssueWebhook, &json_err);

        assert!(err.to_string().starts_with("invalid issue-webhook payload: "));
        assert!(matches!(err, SchemaError::Decode { schema: SchemaKind::IssueWebhook, .. }));
    }
}
