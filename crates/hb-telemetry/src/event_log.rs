//! # Event Log
//!
//! Thread-safe `EventRecorder` used on both sides of the bridge.
//!
//! - **Host side**: a dispatcher records into it while servicing a request,
//!   then drains the current events into the reply package.
//! - **Caller side**: the correlator replays reply events into it.
//!
//! Every record is also mirrored into `tracing` at the matching level.

use parking_lot::Mutex;
use shared_types::{EventLevel, EventRecord, EventRecorder};

#[derive(Debug, Default)]
struct Buffers {
    /// Events since the last drain.
    current: Vec<EventRecord>,
    /// Every event ever recorded.
    all: Vec<EventRecord>,
}

/// Diagnostic log with a drainable "current" window.
#[derive(Debug, Default)]
pub struct EventLog {
    buffers: Mutex<Buffers>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded since the last drain.
    pub fn current(&self) -> Vec<EventRecord> {
        self.buffers.lock().current.clone()
    }

    /// Every event recorded by this log.
    pub fn all(&self) -> Vec<EventRecord> {
        self.buffers.lock().all.clone()
    }

    /// Take the current window, leaving it empty.
    pub fn drain_current(&self) -> Vec<EventRecord> {
        std::mem::take(&mut self.buffers.lock().current)
    }

    pub fn error_count(&self) -> usize {
        self.buffers.lock().all.iter().filter(|e| e.is_error()).count()
    }

    pub fn clear(&self) {
        let mut buffers = self.buffers.lock();
        buffers.current.clear();
        buffers.all.clear();
    }
}

impl EventRecorder for EventLog {
    fn record(&self, event: EventRecord) {
        match event.level {
            EventLevel::Error => tracing::error!(message = %event.message, "diagnostic event"),
            EventLevel::Warning => tracing::warn!(message = %event.message, "diagnostic event"),
            EventLevel::Note => tracing::info!(message = %event.message, "diagnostic event"),
        }

        let mut buffers = self.buffers.lock();
        buffers.all.push(event.clone());
        buffers.current.push(event);
    }
}
