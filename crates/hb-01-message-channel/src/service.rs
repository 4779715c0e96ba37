//! # Message Channel Service
//!
//! One unidirectional, package-granular TCP channel. A session uses two
//! independent instances: one carries requests to the host, the other
//! carries replies back.
//!
//! - A `Listen` endpoint runs an accept loop plus one read task per
//!   connection. Each read task decodes frames and invokes the registered
//!   sink once per package, in arrival order.
//! - A `Connect` endpoint connects on first send. Before reusing its
//!   connection it checks whether the peer has already closed it, and it
//!   reconnects once when a write fails. The check sees only closes the
//!   runtime has already observed; a frame written into a connection the
//!   peer closes concurrently can still be lost, and the caller's wait then
//!   runs to its timeout.

use crate::domain::{
    encode_frame, ChannelConfig, ChannelError, ChannelStats, ChannelStatsSnapshot, Endpoint,
    FrameDecoder,
};
use hb_telemetry::{metric_inc, PACKAGES_RECEIVED, PACKAGES_SENT};
use parking_lot::{Mutex, RwLock};
use shared_types::MessagePackage;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Handler invoked for every received package.
pub type PackageSink = Arc<dyn Fn(MessagePackage) + Send + Sync>;

/// State shared between the channel handle and its background tasks.
struct Shared {
    config: ChannelConfig,
    sink: RwLock<Option<PackageSink>>,
    stats: ChannelStats,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Shared {
    fn deliver(&self, package: MessagePackage) {
        ChannelStats::bump(&self.stats.frames_received);
        metric_inc!(PACKAGES_RECEIVED, &[&package.package_type().to_string()]);

        // Clone out of the lock so a sink may re-register without deadlocking.
        let sink = self.sink.read().clone();
        match sink {
            Some(sink) => sink(package),
            None => {
                ChannelStats::bump(&self.stats.undelivered);
                warn!(
                    request_id = %package.request_id(),
                    package_type = %package.package_type(),
                    "Package received with no sink registered"
                );
            }
        }
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut tasks = self.tasks.lock();
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    fn abort_tasks(&self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }
}

/// Framed, unidirectional package channel.
pub struct MessageChannel {
    endpoint: Endpoint,
    shared: Arc<Shared>,
    writer: tokio::sync::Mutex<Option<TcpStream>>,
    closed: AtomicBool,
}

impl MessageChannel {
    /// Open with default tuning.
    pub async fn open(endpoint: Endpoint) -> Result<Self, ChannelError> {
        Self::open_with_config(endpoint, ChannelConfig::default()).await
    }

    /// Open a channel.
    ///
    /// A `Listen` endpoint is bound immediately; binding port 0 picks a free
    /// port, reported by [`MessageChannel::endpoint`]. A `Connect` endpoint
    /// does no I/O until the first send.
    pub async fn open_with_config(
        endpoint: Endpoint,
        config: ChannelConfig,
    ) -> Result<Self, ChannelError> {
        config.validate()?;
        let shared = Arc::new(Shared {
            config,
            sink: RwLock::new(None),
            stats: ChannelStats::default(),
            tasks: Mutex::new(Vec::new()),
        });

        let endpoint = match endpoint {
            Endpoint::Listen(addr) => {
                let listener = TcpListener::bind(addr).await.map_err(|e| ChannelError::Bind {
                    addr,
                    reason: e.to_string(),
                })?;
                let local = listener.local_addr().map_err(|e| ChannelError::Bind {
                    addr,
                    reason: e.to_string(),
                })?;

                let handle = tokio::spawn(accept_loop(listener, Arc::clone(&shared)));
                shared.track(handle);

                info!(addr = %local, "Message channel listening");
                Endpoint::Listen(local)
            }
            Endpoint::Connect(addr) => {
                debug!(addr = %addr, "Message channel will connect on first send");
                Endpoint::Connect(addr)
            }
        };

        Ok(Self {
            endpoint,
            shared,
            writer: tokio::sync::Mutex::new(None),
            closed: AtomicBool::new(false),
        })
    }

    /// Endpoint with the bound address for listeners.
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Bound address of a listening channel.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match self.endpoint {
            Endpoint::Listen(addr) => Some(addr),
            Endpoint::Connect(_) => None,
        }
    }

    pub fn is_open(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> ChannelStatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Register the handler for received packages, replacing any previous one.
    pub fn on_receive<F>(&self, sink: F)
    where
        F: Fn(MessagePackage) + Send + Sync + 'static,
    {
        *self.shared.sink.write() = Some(Arc::new(sink));
    }

    /// Transmit one package as one frame.
    pub async fn send(&self, package: &MessagePackage) -> Result<(), ChannelError> {
        if !self.is_open() {
            return Err(ChannelError::NotOpen);
        }

        let addr = match self.endpoint {
            Endpoint::Connect(addr) => addr,
            Endpoint::Listen(addr) => return Err(ChannelError::NotSendable(addr)),
        };

        let frame = encode_frame(package, self.shared.config.max_frame_len)?;

        let mut writer = self.writer.lock().await;
        if !self.is_open() {
            return Err(ChannelError::NotOpen);
        }

        let mut retried = false;
        loop {
            let mut stream = match writer.take() {
                Some(stream) if peer_closed(&stream) => {
                    debug!(addr = %addr, "Cached connection closed by peer, reconnecting");
                    ChannelStats::bump(&self.shared.stats.reconnects);
                    connect(addr, self.shared.config.connect_timeout).await?
                }
                Some(stream) => stream,
                None => connect(addr, self.shared.config.connect_timeout).await?,
            };

            match write_frame(&mut stream, &frame).await {
                Ok(()) => {
                    *writer = Some(stream);
                    ChannelStats::bump(&self.shared.stats.frames_sent);
                    metric_inc!(PACKAGES_SENT, &[&package.package_type().to_string()]);
                    debug!(
                        addr = %addr,
                        request_id = %package.request_id(),
                        package_type = %package.package_type(),
                        bytes = frame.len(),
                        "Package sent"
                    );
                    return Ok(());
                }
                Err(e) if !retried => {
                    warn!(addr = %addr, error = %e, "Channel write failed, reconnecting");
                    ChannelStats::bump(&self.shared.stats.reconnects);
                    retried = true;
                }
                Err(e) => {
                    return Err(ChannelError::Write {
                        addr,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    /// Stop background tasks and drop the connection.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.shared.abort_tasks();
        self.shared.sink.write().take();

        if let Some(mut stream) = self.writer.lock().await.take() {
            let _ = stream.shutdown().await;
        }

        info!(endpoint = %self.endpoint, "Message channel closed");
    }
}

impl Drop for MessageChannel {
    fn drop(&mut self) {
        self.shared.abort_tasks();
    }
}

async fn connect(addr: SocketAddr, timeout: Duration) -> Result<TcpStream, ChannelError> {
    let stream = match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            return Err(ChannelError::Connect {
                addr,
                reason: e.to_string(),
            })
        }
        Err(_) => {
            return Err(ChannelError::Connect {
                addr,
                reason: format!("timed out after {:?}", timeout),
            })
        }
    };

    if let Err(e) = stream.set_nodelay(true) {
        debug!(addr = %addr, error = %e, "Could not disable Nagle");
    }
    debug!(addr = %addr, "Message channel connected");
    Ok(stream)
}

/// Whether the peer has closed or reset an outgoing connection.
///
/// Peers never write on a channel connection, so any readable state is EOF
/// or an error.
fn peer_closed(stream: &TcpStream) -> bool {
    let mut probe = [0u8; 1];
    match stream.try_read(&mut probe) {
        Ok(0) => true,
        Ok(_) => false,
        Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => false,
        Err(_) => true,
    }
}

async fn write_frame(stream: &mut TcpStream, frame: &[u8]) -> std::io::Result<()> {
    stream.write_all(frame).await?;
    stream.flush().await
}

async fn accept_loop(listener: TcpListener, shared: Arc<Shared>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                ChannelStats::bump(&shared.stats.connections_accepted);
                debug!(peer = %peer, "Accepted channel connection");
                let handle = tokio::spawn(read_loop(stream, peer, Arc::clone(&shared)));
                shared.track(handle);
            }
            Err(e) => {
                warn!(error = %e, "Accept failed");
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }
}

async fn read_loop(mut stream: TcpStream, peer: SocketAddr, shared: Arc<Shared>) {
    let mut decoder = FrameDecoder::new(shared.config.max_frame_len);
    let mut chunk = vec![0u8; shared.config.read_chunk_size];

    loop {
        let read = match stream.read(&mut chunk).await {
            Ok(0) => {
                debug!(peer = %peer, "Channel peer closed connection");
                return;
            }
            Ok(read) => read,
            Err(e) => {
                debug!(peer = %peer, error = %e, "Channel read failed");
                return;
            }
        };

        decoder.extend(&chunk[..read]);

        loop {
            match decoder.decode_next() {
                Ok(Some(package)) => shared.deliver(package),
                Ok(None) => break,
                Err(e) if e.is_fatal() => {
                    ChannelStats::bump(&shared.stats.decode_failures);
                    warn!(peer = %peer, error = %e, "Dropping desynchronized connection");
                    return;
                }
                Err(e) => {
                    ChannelStats::bump(&shared.stats.decode_failures);
                    warn!(peer = %peer, error = %e, "Skipping undecodable frame");
                }
            }
        }
    }
}
