//! # Request Correlator Service
//!
//! Call/response semantics over two one-way channels.
//!
//! Flow:
//! 1. `send` takes the in-flight lock, so one request is outstanding at a time
//! 2. A fresh `RequestId` is registered in the pending slot
//! 3. The request goes out on the transport
//! 4. The pull channel sink calls `ReplyDelivery::deliver` with each reply
//! 5. `send` awaits the slot under the max wait, replays the reply events
//!    into the recorder and returns the payload

use crate::domain::{
    CorrelatorError, PendingSlot, PendingStats, Response, CONNECTION_CHECK_WAIT,
    CONNECTION_FAILED_MESSAGE,
};
use crate::ports::PackageTransport;
use hb_telemetry::{metric_inc, REQUEST_TIMEOUTS, STALE_REPLIES};
use serde_json::Value;
use shared_types::{EventRecord, EventRecorder, MessagePackage, PackageType, RequestId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Cloneable handle the reply channel's sink delivers through.
#[derive(Clone)]
pub struct ReplyDelivery {
    pending: Arc<PendingSlot>,
}

impl ReplyDelivery {
    /// Hand a received package to the waiting caller.
    ///
    /// Returns false when the package answers no outstanding request.
    pub fn deliver(&self, package: MessagePackage) -> bool {
        let completed = self.pending.complete(package);
        if !completed {
            metric_inc!(STALE_REPLIES);
        }
        completed
    }
}

/// Correlates requests with their replies.
pub struct RequestCorrelator<T: PackageTransport> {
    transport: T,
    pending: Arc<PendingSlot>,
    next_id: AtomicU64,
    in_flight: tokio::sync::Mutex<()>,
    max_wait: Duration,
    recorder: Arc<dyn EventRecorder>,
}

impl<T: PackageTransport> RequestCorrelator<T> {
    pub fn new(transport: T, max_wait: Duration, recorder: Arc<dyn EventRecorder>) -> Self {
        Self {
            transport,
            pending: Arc::new(PendingSlot::new()),
            next_id: AtomicU64::new(RequestId::FIRST.0),
            in_flight: tokio::sync::Mutex::new(()),
            max_wait,
            recorder,
        }
    }

    /// Handle to wire into the reply channel's sink.
    pub fn delivery(&self) -> ReplyDelivery {
        ReplyDelivery {
            pending: Arc::clone(&self.pending),
        }
    }

    /// Deliver a reply directly.
    pub fn deliver(&self, package: MessagePackage) -> bool {
        self.delivery().deliver(package)
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// True while a request is awaiting its reply.
    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    pub fn pending_stats(&self) -> &PendingStats {
        self.pending.stats()
    }

    /// Send a request and wait up to the configured max wait for its reply.
    pub async fn send(
        &self,
        package_type: PackageType,
        data: Vec<Value>,
    ) -> Result<Response, CorrelatorError> {
        self.send_with_wait(package_type, data, self.max_wait).await
    }

    /// Send a request and wait up to `max_wait` for its reply.
    ///
    /// A second call waits until the first resolves. A timeout abandons only
    /// the local wait: a reply that arrives later is discarded.
    pub async fn send_with_wait(
        &self,
        package_type: PackageType,
        data: Vec<Value>,
        max_wait: Duration,
    ) -> Result<Response, CorrelatorError> {
        let _in_flight = self.in_flight.lock().await;

        let request_id = self.allocate_id();
        let request = MessagePackage::request(request_id, package_type, data);
        let reply = self.pending.register(request_id, package_type);

        if let Err(e) = self.transport.transmit(&request).await {
            self.pending.cancel(request_id);
            let error = CorrelatorError::Transport {
                request_id,
                reason: e.to_string(),
            };
            warn!(request_id = %request_id, error = %e, "Request not sent");
            self.recorder.record(EventRecord::error(error.to_string()));
            return Err(error);
        }

        debug!(
            request_id = %request_id,
            package_type = %package_type,
            max_wait_ms = max_wait.as_millis(),
            "Awaiting reply"
        );

        match tokio::time::timeout(max_wait, reply).await {
            Ok(Ok(reply)) => {
                let (payload, events) = reply.into_parts();
                self.recorder.record_all(events.clone());
                debug!(
                    request_id = %request_id,
                    items = payload.len(),
                    events = events.len(),
                    "Reply received"
                );
                Ok(Response {
                    request_id,
                    payload,
                    events,
                })
            }
            Ok(Err(_)) => {
                warn!(request_id = %request_id, "Pending request dropped before reply");
                Err(CorrelatorError::Cancelled(request_id))
            }
            Err(_) => {
                self.pending.cancel(request_id);
                metric_inc!(REQUEST_TIMEOUTS);
                let error = CorrelatorError::NoResponse {
                    request_id,
                    waited: max_wait,
                };
                warn!(request_id = %request_id, package_type = %package_type, "{}", error);
                self.recorder.record(EventRecord::error(error.to_string()));
                Err(error)
            }
        }
    }

    /// Round-trip a `ConnectionCheck` with a short fixed wait.
    pub async fn check_connection(&self) -> bool {
        let connected = match self
            .send_with_wait(PackageType::ConnectionCheck, Vec::new(), CONNECTION_CHECK_WAIT)
            .await
        {
            Ok(response) => response.payload.first() == Some(&Value::Bool(true)),
            Err(_) => false,
        };

        if !connected {
            self.recorder
                .record(EventRecord::error(CONNECTION_FAILED_MESSAGE));
        }
        connected
    }

    fn allocate_id(&self) -> RequestId {
        let previous = self
            .next_id
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |id| {
                Some(RequestId(id).next().0)
            })
            .unwrap_or_else(|id| id);
        RequestId(previous)
    }
}
