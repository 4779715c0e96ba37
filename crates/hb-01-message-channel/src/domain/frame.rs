//! # Frame Codec
//!
//! Every package travels as one frame:
//!
//! ```text
//! +-------+-------+----------------+---------------------+
//! | 'H'   | 'B'   | length (u32 BE)| JSON payload        |
//! +-------+-------+----------------+---------------------+
//! ```
//!
//! The decoder accumulates arbitrary read chunks and yields exactly one
//! package per complete frame, in order.

use super::errors::FrameError;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use shared_types::MessagePackage;

/// Frame magic, used to detect a desynchronized stream.
pub const FRAME_MAGIC: [u8; 2] = *b"HB";

/// Magic plus length prefix.
pub const HEADER_LEN: usize = 6;

/// Default payload limit (16 MiB).
pub const DEFAULT_MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Largest payload the u32 length prefix can describe.
pub const FRAME_LEN_LIMIT: usize = u32::MAX as usize;

/// Encode one package into a frame.
pub fn encode_frame(package: &MessagePackage, max_frame_len: usize) -> Result<Bytes, FrameError> {
    let payload =
        serde_json::to_vec(package).map_err(|e| FrameError::Payload(e.to_string()))?;

    let max = max_frame_len.min(FRAME_LEN_LIMIT);
    let len = match u32::try_from(payload.len()) {
        Ok(len) if payload.len() <= max => len,
        _ => {
            return Err(FrameError::TooLarge {
                len: payload.len(),
                max,
            })
        }
    };

    let mut frame = BytesMut::with_capacity(HEADER_LEN + payload.len());
    frame.put_slice(&FRAME_MAGIC);
    frame.put_u32(len);
    frame.put_slice(&payload);
    Ok(frame.freeze())
}

/// Incremental frame decoder for one connection.
#[derive(Debug)]
pub struct FrameDecoder {
    buffer: BytesMut,
    max_frame_len: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_LEN)
    }
}

impl FrameDecoder {
    pub fn new(max_frame_len: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(8 * 1024),
            max_frame_len,
        }
    }

    /// Append bytes as read from the socket.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Bytes buffered but not yet decoded.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Decode the next complete frame, if any.
    ///
    /// `Ok(None)` means more bytes are needed. A `Payload` error consumes the
    /// bad frame so decoding can continue; other errors leave the stream
    /// unusable.
    pub fn decode_next(&mut self) -> Result<Option<MessagePackage>, FrameError> {
        if self.buffer.len() >= FRAME_MAGIC.len() && self.buffer[..2] != FRAME_MAGIC {
            return Err(FrameError::BadMagic {
                found: [self.buffer[0], self.buffer[1]],
            });
        }

        if self.buffer.len() < HEADER_LEN {
            return Ok(None);
        }

        let len = u32::from_be_bytes([
            self.buffer[2],
            self.buffer[3],
            self.buffer[4],
            self.buffer[5],
        ]) as usize;

        if len > self.max_frame_len {
            return Err(FrameError::TooLarge {
                len,
                max: self.max_frame_len,
            });
        }

        if self.buffer.len() < HEADER_LEN + len {
            self.buffer.reserve(HEADER_LEN + len - self.buffer.len());
            return Ok(None);
        }

        self.buffer.advance(HEADER_LEN);
        let payload = self.buffer.split_to(len);

        serde_json::from_slice(&payload)
            .map(Some)
            .map_err(|e| FrameError::Payload(e.to_string()))
    }
}
