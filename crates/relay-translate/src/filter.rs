//! Issue action gate.
//!
//! Issue webhooks fire for every lifecycle change. Only newly created issues
//! are forwarded unless the relay is configured to forward every action.

use crate::translate::TranslatorConfig;

/// The action forwarded when not processing all actions.
pub const CREATED_ACTION: &str = "created";

/// Outcome of the action gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Translate and deliver the event.
    Process,
    /// Acknowledge the webhook without forwarding it.
    Skip {
        /// The action that was filtered out.
        action: String,
    },
}

impl Decision {
    /// Returns true if the event should be forwarded.
    #[must_use]
    pub const fn is_process(&self) -> bool {
        matches!(self, Self::Process)
    }
}

/// Decides whether an inbound action is forwarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionFilter {
    process_all: bool,
}

impl ActionFilter {
    /// Creates a filter.
    #[must_use]
    pub const fn new(process_all: bool) -> Self {
        Self { process_all }
    }

    /// Creates a filter from translator settings.
    #[must_use]
    pub const fn from_config(config: &TranslatorConfig) -> Self {
        Self::new(config.process_all_actions)
    }

    /// Applies the gate.
    ///
    /// Payloads without a lifecycle action are always processed.
    #[must_use]
    pub fn decide(&self, action: Option<&str>) -> Decision {
        match action {
            None => Decision::Process,
            Some(_) if self.process_all => Decision::Process,
            Some(action) if action.eq_ignore_ascii_case(CREATED_ACTION) => Decision::Process,
            Some(action) => Decision::Skip {
                action: action.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Some("created"), false, true ; "created is processed")]
    #[test_case(Some("Created"), false, true ; "created is case insensitive")]
    #[test_case(Some("resolved"), false, false ; "resolved is skipped")]
    #[test_case(Some("ignored"), false, false ; "ignored is skipped")]
    #[test_case(Some("resolved"), true, true ; "process all forwards resolved")]
    #[test_case(None, false, true ; "no action is processed")]
    fn decide(action: Option<&str>, process_all: bool, expected: bool) {
        let filter = ActionFilter::new(process_all);
        assert_eq!(filter.decide(action).is_process(), expected);
    }

    #[test]
    fn skip_carries_action() {
        let decision = ActionFilter::default().decide(Some("assigned"));

        assert_eq!(
            decision,
            Decision::Skip {
                action: "assigned".to_string()
            }
        );
    }

    #[test]
    fn from_config() {
        let filter = ActionFilter::from_config(&TranslatorConfig::new(false, true));
        assert!(filter.decide(Some("archived")).is_process());
    }
}
