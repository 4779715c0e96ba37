//! # Host Listener
//!
//! Host side of a session. Requests arrive on a listening channel, are
//! handled one at a time in arrival order, and each reply goes back on a
//! separate connecting channel with the request's id and type.
//!
//! ```text
//! push channel ──► listener (Listen) ──► queue ──► PackageHandler
//!                                                      │
//! pull channel ◄── reply channel (Connect) ◄───────────┘
//! ```

use async_trait::async_trait;
use hb_01_message_channel::{ChannelError, Endpoint, MessageChannel};
use serde_json::Value;
use shared_types::{EventRecord, MessagePackage};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Produces the reply body for one request.
#[async_trait]
pub trait PackageHandler: Send + Sync + 'static {
    /// Reply data plus the diagnostic events to ship with it.
    async fn handle(&self, request: &MessagePackage) -> (Vec<Value>, Vec<EventRecord>);
}

#[async_trait]
impl<H: PackageHandler + ?Sized> PackageHandler for Arc<H> {
    async fn handle(&self, request: &MessagePackage) -> (Vec<Value>, Vec<EventRecord>) {
        (**self).handle(request).await
    }
}

pub struct HostListener {
    requests: Arc<MessageChannel>,
    replies: Arc<MessageChannel>,
    handled: Arc<AtomicU64>,
    worker: JoinHandle<()>,
}

impl HostListener {
    /// Listen for requests on `listen` and reply to `reply_to`.
    ///
    /// The reply channel connects lazily, so the caller's pull channel only
    /// has to be up when the first reply is sent.
    pub async fn start<H: PackageHandler>(
        listen: SocketAddr,
        reply_to: SocketAddr,
        handler: H,
    ) -> Result<Self, ChannelError> {
        let requests = Arc::new(MessageChannel::open(Endpoint::Listen(listen)).await?);
        let replies = Arc::new(MessageChannel::open(Endpoint::Connect(reply_to)).await?);

        let (queue, inbox) = mpsc::unbounded_channel();
        requests.on_receive(move |package| {
            if queue.send(package).is_err() {
                debug!("Host listener stopped, request dropped");
            }
        });

        let handled = Arc::new(AtomicU64::new(0));
        let worker = tokio::spawn(serve(
            inbox,
            handler,
            Arc::clone(&replies),
            Arc::clone(&handled),
        ));

        info!(
            listen = %requests.endpoint(),
            reply_to = %reply_to,
            "Host listener started"
        );

        Ok(Self {
            requests,
            replies,
            handled,
            worker,
        })
    }

    /// Bound address of the request channel.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.requests.local_addr()
    }

    /// Requests answered so far.
    pub fn handled(&self) -> u64 {
        self.handled.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.requests.is_open() && !self.worker.is_finished()
    }

    pub async fn stop(&self) {
        self.requests.close().await;
        self.worker.abort();
        self.replies.close().await;
        info!("Host listener stopped");
    }
}

impl Drop for HostListener {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn serve<H: PackageHandler>(
    mut inbox: mpsc::UnboundedReceiver<MessagePackage>,
    handler: H,
    replies: Arc<MessageChannel>,
    handled: Arc<AtomicU64>,
) {
    while let Some(request) = inbox.recv().await {
        debug!(
            request_id = %request.request_id(),
            package_type = %request.package_type(),
            "Handling request"
        );
        let (data, events) = handler.handle(&request).await;
        let reply = MessagePackage::reply(&request, data, events);
        handled.fetch_add(1, Ordering::Relaxed);

        if let Err(e) = replies.send(&reply).await {
            warn!(request_id = %request.request_id(), error = %e, "Reply not sent");
        }
    }
}
