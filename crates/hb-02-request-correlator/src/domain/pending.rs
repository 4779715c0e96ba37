//! Pending Slot - rendezvous between the awaiting caller and the reply
//! delivery path.
//!
//! Holds at most one outstanding request. A reply completes the slot only
//! when it echoes the outstanding `RequestId`; anything else is stale.

use parking_lot::Mutex;
use shared_types::{MessagePackage, PackageType, RequestId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// The request currently awaiting its reply
struct Outstanding {
    request_id: RequestId,
    package_type: PackageType,
    sender: oneshot::Sender<MessagePackage>,
    created_at: Instant,
}

/// Statistics for the pending slot
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Total requests registered
    pub total_registered: AtomicU64,
    /// Total requests completed by a matching reply
    pub total_completed: AtomicU64,
    /// Replies discarded for a mismatched or missing request
    pub total_stale: AtomicU64,
    /// Total requests cancelled (timeout or send failure)
    pub total_cancelled: AtomicU64,
}

/// Single-slot pending request store.
#[derive(Default)]
pub struct PendingSlot {
    slot: Mutex<Option<Outstanding>>,
    stats: PendingStats,
}

impl PendingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the outstanding request and get the receiver for its reply.
    ///
    /// Replaces any request still registered; its waiter observes a closed
    /// channel.
    pub fn register(
        &self,
        request_id: RequestId,
        package_type: PackageType,
    ) -> oneshot::Receiver<MessagePackage> {
        let (tx, rx) = oneshot::channel();

        let previous = self.slot.lock().replace(Outstanding {
            request_id,
            package_type,
            sender: tx,
            created_at: Instant::now(),
        });
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        if let Some(previous) = previous {
            self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
            warn!(
                request_id = %previous.request_id,
                "Replacing a request that was still outstanding"
            );
        }

        debug!(
            request_id = %request_id,
            package_type = %package_type,
            "Registered pending request"
        );

        rx
    }

    /// Complete the outstanding request with `reply`.
    ///
    /// Returns true if the reply matched and was handed to the waiter.
    pub fn complete(&self, reply: MessagePackage) -> bool {
        let outstanding = {
            let mut slot = self.slot.lock();
            match slot.as_ref() {
                Some(current) if reply.is_reply_to(current.request_id) => slot.take(),
                _ => None,
            }
        };

        let Some(outstanding) = outstanding else {
            self.stats.total_stale.fetch_add(1, Ordering::Relaxed);
            warn!(
                request_id = %reply.request_id(),
                package_type = %reply.package_type(),
                "Reply for unknown or abandoned request discarded"
            );
            return false;
        };

        let response_time = outstanding.created_at.elapsed();
        match outstanding.sender.send(reply) {
            Ok(()) => {
                self.stats.total_completed.fetch_add(1, Ordering::Relaxed);
                debug!(
                    request_id = %outstanding.request_id,
                    package_type = %outstanding.package_type,
                    response_time_ms = response_time.as_millis(),
                    "Completed pending request"
                );
                true
            }
            Err(_) => {
                // Waiter gave up between the match and the send.
                self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
                debug!(
                    request_id = %outstanding.request_id,
                    "Pending request receiver dropped"
                );
                false
            }
        }
    }

    /// Cancel the outstanding request if it is `request_id`.
    pub fn cancel(&self, request_id: RequestId) -> bool {
        let mut slot = self.slot.lock();
        if slot.as_ref().is_some_and(|o| o.request_id == request_id) {
            slot.take();
            self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Id of the request awaiting its reply, if any.
    pub fn outstanding(&self) -> Option<RequestId> {
        self.slot.lock().as_ref().map(|o| o.request_id)
    }

    pub fn is_pending(&self) -> bool {
        self.slot.lock().is_some()
    }

    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply_for(id: u64) -> MessagePackage {
        let request = MessagePackage::request(RequestId(id), PackageType::Pull, vec![]);
        MessagePackage::reply(&request, vec![json!(id)], vec![])
    }

    #[tokio::test]
    async fn test_register_and_complete() {
        let slot = PendingSlot::new();
        let rx = slot.register(RequestId(1), PackageType::Pull);
        assert_eq!(slot.outstanding(), Some(RequestId(1)));

        assert!(slot.complete(reply_for(1)));
        let reply = rx.await.unwrap();
        assert_eq!(reply.data(), &[json!(1)]);
        assert!(!slot.is_pending());
    }

    #[tokio::test]
    async fn test_mismatched_reply_is_stale() {
        let slot = PendingSlot::new();
        let _rx = slot.register(RequestId(2), PackageType::Pull);

        assert!(!slot.complete(reply_for(1)));
        assert!(slot.is_pending());
        assert_eq!(slot.stats().total_stale.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_reply_with_nothing_outstanding() {
        let slot = PendingSlot::new();
        assert!(!slot.complete(reply_for(1)));
        assert_eq!(slot.stats().total_stale.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_cancel() {
        let slot = PendingSlot::new();
        let _rx = slot.register(RequestId(3), PackageType::Delete);

        assert!(!slot.cancel(RequestId(4)));
        assert!(slot.cancel(RequestId(3)));
        assert!(!slot.cancel(RequestId(3)));
        assert_eq!(slot.stats().total_cancelled.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_register_replaces_previous() {
        let slot = PendingSlot::new();
        let first = slot.register(RequestId(1), PackageType::Pull);
        let _second = slot.register(RequestId(2), PackageType::Pull);

        assert!(first.await.is_err());
        assert_eq!(slot.outstanding(), Some(RequestId(2)));
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let slot = PendingSlot::new();
        drop(slot.register(RequestId(5), PackageType::Pull));
        assert!(!slot.complete(reply_for(5)));
        assert_eq!(slot.stats().total_completed.load(Ordering::Relaxed), 0);
    }
}
