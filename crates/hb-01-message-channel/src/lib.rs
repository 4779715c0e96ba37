//! # Message Channel (hb-01)
//!
//! Package-granular, unidirectional transport between the caller process and
//! the host process.
//!
//! ## Architecture
//!
//! ```text
//! caller                                   host
//! push channel (Connect) ──── frames ────→ listener (Listen) ──→ sink
//! pull channel (Listen)  ←─── frames ──── reply channel (Connect)
//!        │
//!        └──→ sink (correlator delivery)
//! ```
//!
//! ## Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Whole packages | The sink sees only fully reassembled packages |
//! | 2 | Arrival order | Packages from one connection reach the sink in order |
//! | 3 | Bounded frames | Payloads above `max_frame_len` are rejected |
//! | 4 | No shared state | The two channels of a session are independent instances |
//!
//! ## Crate Structure
//!
//! - `domain/` - Frame codec, endpoint, errors and counters
//! - `service.rs` - The tokio-backed `MessageChannel`

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod service;

pub use domain::{
    encode_frame, ChannelConfig, ChannelError, ChannelStatsSnapshot, Endpoint, FrameDecoder,
    FrameError, DEFAULT_MAX_FRAME_LEN, FRAME_LEN_LIMIT, FRAME_MAGIC,
};
pub use service::{MessageChannel, PackageSink};
