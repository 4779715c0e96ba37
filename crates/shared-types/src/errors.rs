//! # Error Types
//!
//! The error taxonomy surfaced at the process boundary. Crate-local errors
//! convert into `AdapterError`; every `AdapterError` becomes a diagnostic
//! event and a boolean/empty result, never an unhandled fault.

use crate::events::EventRecord;
use thiserror::Error;

/// Errors surfaced to callers of the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// Channel unavailable or request timed out.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Element filtered out by the write-access policy. A skip, not a fault.
    #[error("Element {element} skipped by write-access policy: {reason}")]
    PolicyDenied { element: String, reason: String },

    /// No identity or name match could be resolved.
    #[error("Identity not found: {0}")]
    IdentityNotFound(String),

    /// Missing document or missing input collection.
    #[error("Null input: {0}")]
    NullInput(String),

    /// Host reported nothing affected by a non-empty batch.
    #[error("Transaction failure: {0}")]
    TransactionFailure(String),
}

impl AdapterError {
    /// Diagnostic event for this error. Policy skips are recorded as notes.
    pub fn to_event(&self) -> EventRecord {
        match self {
            Self::PolicyDenied { .. } => EventRecord::note(self.to_string()),
            _ => EventRecord::error(self.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLevel;

    #[test]
    fn test_policy_denied_is_a_note() {
        let error = AdapterError::PolicyDenied {
            element: "u-1".into(),
            reason: "unique id not allowed".into(),
        };
        assert_eq!(error.to_event().level, EventLevel::Note);
    }

    #[test]
    fn test_other_errors_are_errors() {
        let error = AdapterError::NullInput("document is missing".into());
        let event = error.to_event();
        assert!(event.is_error());
        assert_eq!(event.message, "Null input: document is missing");
    }
}
