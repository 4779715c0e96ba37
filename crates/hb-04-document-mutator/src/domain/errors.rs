//! # Mutation Errors
//!
//! Every variant is recorded as a diagnostic event and surfaced to callers as
//! a failed outcome. None of them escapes as a panic.

use shared_types::{AdapterError, EventRecord, NumericId};
use thiserror::Error;

/// Failures reported by a host document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("no transaction is active")]
    NoTransaction,

    #[error("a transaction is already active")]
    TransactionActive,

    #[error("element {0} does not exist")]
    ElementNotFound(NumericId),

    /// Host-specific failure.
    #[error("host document error: {0}")]
    Host(String),
}

/// Failures of a translator callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    /// The object cannot be expressed in the host (or vice versa).
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The object is malformed.
    #[error("invalid object: {0}")]
    Invalid(String),

    /// The document refused the write. Aborts the whole batch.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Errors of one mutating or reading batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// Document or input collection missing.
    #[error("{0}")]
    NullInput(&'static str),

    /// Input collection present but empty.
    #[error("no elements were given")]
    EmptyInput,

    /// A target matched no element.
    #[error("no element found for {0}")]
    IdentityNotFound(String),

    /// Every resolved element was skipped by the write-access policy.
    #[error("no element left to mutate after policy filtering")]
    NothingToMutate,

    /// The host reported nothing affected by a non-empty batch.
    #[error("transaction failed: {0}")]
    TransactionFailure(String),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl MutationError {
    /// Diagnostic event for this error.
    pub fn to_event(&self) -> EventRecord {
        match self {
            Self::EmptyInput | Self::NothingToMutate => EventRecord::warning(self.to_string()),
            _ => EventRecord::error(self.to_string()),
        }
    }
}

impl From<MutationError> for AdapterError {
    fn from(error: MutationError) -> Self {
        match error {
            MutationError::NullInput(_) | MutationError::EmptyInput => {
                AdapterError::NullInput(error.to_string())
            }
            MutationError::IdentityNotFound(target) => AdapterError::IdentityNotFound(target),
            MutationError::NothingToMutate
            | MutationError::TransactionFailure(_)
            | MutationError::Document(_) => AdapterError::TransactionFailure(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::EventLevel;

    #[test]
    fn test_event_levels() {
        assert_eq!(MutationError::EmptyInput.to_event().level, EventLevel::Warning);
        assert_eq!(
            MutationError::NullInput("document is missing").to_event().level,
            EventLevel::Error
        );
    }

    #[test]
    fn test_adapter_error_mapping() {
        let error: AdapterError = MutationError::IdentityNotFound("Level 'x'".into()).into();
        assert_eq!(error, AdapterError::IdentityNotFound("Level 'x'".into()));

        let error: AdapterError = MutationError::from(DocumentError::NoTransaction).into();
        assert!(matches!(error, AdapterError::TransactionFailure(_)));
    }
}
