//! # Diagnostic Events
//!
//! Records produced while servicing a request. The host collects them and
//! ships them back inside the reply package; the caller replays them into its
//! own ambient log in the original order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Severity of a diagnostic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Error,
    Warning,
    Note,
}

impl fmt::Display for EventLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
            Self::Note => f.write_str("note"),
        }
    }
}

/// One diagnostic entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub level: EventLevel,
    pub message: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl EventRecord {
    pub fn new(level: EventLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: now_ms(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(EventLevel::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(EventLevel::Warning, message)
    }

    pub fn note(message: impl Into<String>) -> Self {
        Self::new(EventLevel::Note, message)
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == EventLevel::Error
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// Event-recording collaborator (the ambient diagnostic log).
///
/// Implementations must be callable from any thread: the channel delivery
/// path and the caller may both record.
pub trait EventRecorder: Send + Sync {
    /// Record one event.
    fn record(&self, event: EventRecord);

    /// Record events keeping their order.
    fn record_all(&self, events: Vec<EventRecord>) {
        for event in events {
            self.record(event);
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct VecRecorder(Mutex<Vec<EventRecord>>);

    impl EventRecorder for VecRecorder {
        fn record(&self, event: EventRecord) {
            self.0.lock().unwrap().push(event);
        }
    }

    #[test]
    fn test_record_all_keeps_order() {
        let recorder = VecRecorder::default();
        recorder.record_all(vec![
            EventRecord::note("first"),
            EventRecord::warning("second"),
            EventRecord::error("third"),
        ]);

        let events = recorder.0.lock().unwrap();
        let messages: Vec<_> = events.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
        assert!(events[2].is_error());
    }

    #[test]
    fn test_level_serializes_lowercase() {
        let json = serde_json::to_string(&EventLevel::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }

    #[test]
    fn test_display() {
        let event = EventRecord::error("boom");
        assert_eq!(event.to_string(), "[error] boom");
    }
}
