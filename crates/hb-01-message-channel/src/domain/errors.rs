//! Channel and framing errors.

use shared_types::AdapterError;
use std::net::SocketAddr;
use thiserror::Error;

/// Errors produced while encoding or decoding a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Stream out of sync: the two leading bytes are not the frame magic.
    #[error("bad frame magic: {found:02x?}")]
    BadMagic { found: [u8; 2] },

    /// Declared payload larger than the configured maximum.
    #[error("frame payload of {len} bytes exceeds limit of {max} bytes")]
    TooLarge { len: usize, max: usize },

    /// Payload is not a valid package.
    #[error("invalid package payload: {0}")]
    Payload(String),
}

impl FrameError {
    /// True when the byte stream can no longer be trusted and the connection
    /// must be dropped.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Payload(_))
    }
}

/// Errors surfaced by `MessageChannel`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The channel was closed.
    #[error("channel is not open")]
    NotOpen,

    /// Channel tuning out of range.
    #[error("invalid channel config: {0}")]
    InvalidConfig(String),

    /// `send` called on a listening endpoint.
    #[error("listening endpoint {0} cannot send")]
    NotSendable(SocketAddr),

    /// Could not bind the listening socket.
    #[error("failed to bind {addr}: {reason}")]
    Bind { addr: SocketAddr, reason: String },

    /// Could not reach the peer.
    #[error("failed to connect to {addr}: {reason}")]
    Connect { addr: SocketAddr, reason: String },

    /// Write failed after reconnecting.
    #[error("write to {addr} failed: {reason}")]
    Write { addr: SocketAddr, reason: String },

    #[error(transparent)]
    Frame(#[from] FrameError),
}

impl From<ChannelError> for AdapterError {
    fn from(error: ChannelError) -> Self {
        AdapterError::Connection(error.to_string())
    }
}
