//! Channel endpoint and tuning.

use super::errors::ChannelError;
use super::frame::{DEFAULT_MAX_FRAME_LEN, FRAME_LEN_LIMIT};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Which end of a unidirectional channel this instance is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Accept connections and deliver every decoded package to the sink.
    Listen(SocketAddr),
    /// Send packages to a listening peer.
    Connect(SocketAddr),
}

impl Endpoint {
    pub fn addr(&self) -> SocketAddr {
        match self {
            Self::Listen(addr) | Self::Connect(addr) => *addr,
        }
    }

    #[must_use]
    pub fn is_listening(&self) -> bool {
        matches!(self, Self::Listen(_))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listen(addr) => write!(f, "listen://{}", addr),
            Self::Connect(addr) => write!(f, "connect://{}", addr),
        }
    }
}

/// Channel tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Largest accepted payload. At most [`FRAME_LEN_LIMIT`].
    pub max_frame_len: usize,
    /// Bound on establishing an outgoing connection.
    pub connect_timeout: Duration,
    /// Size of each socket read. Must be non-zero, a zero-byte read means
    /// the peer closed.
    pub read_chunk_size: usize,
}

impl ChannelConfig {
    pub fn validate(&self) -> Result<(), ChannelError> {
        if self.max_frame_len == 0 || self.max_frame_len > FRAME_LEN_LIMIT {
            return Err(ChannelError::InvalidConfig(format!(
                "max_frame_len must be within 1..={FRAME_LEN_LIMIT}, got {}",
                self.max_frame_len
            )));
        }
        if self.read_chunk_size == 0 {
            return Err(ChannelError::InvalidConfig(
                "read_chunk_size must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            connect_timeout: Duration::from_secs(5),
            read_chunk_size: 8 * 1024,
        }
    }
}
