pub mod errors;
pub mod pending;

pub use errors::CorrelatorError;
pub use pending::{PendingSlot, PendingStats};

use serde_json::Value;
use shared_types::{EventRecord, RequestId};
use std::time::Duration;

/// Wait used by the connection check.
pub const CONNECTION_CHECK_WAIT: Duration = Duration::from_secs(5);

/// Event recorded when the connection check fails.
pub const CONNECTION_FAILED_MESSAGE: &str =
    "Failed to connect to host. Make sure the host listener is running and the ports match.";

/// Payload and diagnostic events of a matched reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub request_id: RequestId,
    pub payload: Vec<Value>,
    /// Already replayed into the caller's recorder, in this order.
    pub events: Vec<EventRecord>,
}

impl Response {
    /// True if any replayed event is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.events.iter().any(EventRecord::is_error)
    }
}
