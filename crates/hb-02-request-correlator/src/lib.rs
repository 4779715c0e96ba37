//! # Request Correlator (hb-02)
//!
//! Turns the push/pull channel pair into awaitable calls.
//!
//! ## Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Single flight | At most one request outstanding per correlator |
//! | 2 | Bounded wait | A call resolves with a reply or `NoResponse` after `max_wait` |
//! | 3 | Matching replies | Only a reply echoing the outstanding `RequestId` completes a call |
//! | 4 | Ordered replay | Reply events reach the recorder in their original order |
//!
//! ## Crate Structure
//!
//! - `domain/` - Pending slot, response and errors
//! - `ports/` - `PackageTransport`, the sending seam
//! - `adapters/` - `PackageTransport` for `MessageChannel`
//! - `service.rs` - `RequestCorrelator`

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    CorrelatorError, PendingSlot, PendingStats, Response, CONNECTION_CHECK_WAIT,
    CONNECTION_FAILED_MESSAGE,
};
pub use ports::PackageTransport;
pub use service::{ReplyDelivery, RequestCorrelator};
