//! Per-channel counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for one channel instance
#[derive(Debug, Default)]
pub struct ChannelStats {
    /// Frames written
    pub frames_sent: AtomicU64,
    /// Frames decoded into packages
    pub frames_received: AtomicU64,
    /// Frames that could not be decoded
    pub decode_failures: AtomicU64,
    /// Packages decoded while no sink was registered
    pub undelivered: AtomicU64,
    /// Incoming connections accepted
    pub connections_accepted: AtomicU64,
    /// Outgoing connections re-established after a broken write
    pub reconnects: AtomicU64,
}

/// Point-in-time copy of `ChannelStats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStatsSnapshot {
    pub frames_sent: u64,
    pub frames_received: u64,
    pub decode_failures: u64,
    pub undelivered: u64,
    pub connections_accepted: u64,
    pub reconnects: u64,
}

impl ChannelStats {
    pub fn snapshot(&self) -> ChannelStatsSnapshot {
        ChannelStatsSnapshot {
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            undelivered: self.undelivered.load(Ordering::Relaxed),
            connections_accepted: self.connections_accepted.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
