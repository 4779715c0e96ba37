use shared_types::{AdapterError, RequestId};
use std::time::Duration;
use thiserror::Error;

/// Correlation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrelatorError {
    /// No matching reply arrived within the wait.
    #[error("No response to request {request_id} within {waited:?}")]
    NoResponse {
        request_id: RequestId,
        waited: Duration,
    },

    /// The request could not be transmitted.
    #[error("Failed to send request {request_id}: {reason}")]
    Transport { request_id: RequestId, reason: String },

    /// The wait was abandoned before a reply arrived.
    #[error("Request {0} was cancelled")]
    Cancelled(RequestId),
}

impl From<CorrelatorError> for AdapterError {
    fn from(error: CorrelatorError) -> Self {
        AdapterError::Connection(error.to_string())
    }
}
