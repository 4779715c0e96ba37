//! Transport-independent pieces of the channel: framing, endpoints, errors
//! and counters.

pub mod config;
pub mod errors;
pub mod frame;
pub mod stats;

pub use config::{ChannelConfig, Endpoint};
pub use errors::{ChannelError, FrameError};
pub use frame::{
    encode_frame, FrameDecoder, DEFAULT_MAX_FRAME_LEN, FRAME_LEN_LIMIT, FRAME_MAGIC, HEADER_LEN,
};
pub use stats::{ChannelStats, ChannelStatsSnapshot};
