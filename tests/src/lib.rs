//! # Host-Bridge Test Suite
//!
//! Cross-crate flows over real loopback TCP.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs          # Bridges, scripted hosts, sample documents
//! └── integration/
//!     ├── flows.rs         # Session → listener → dispatcher → document
//!     ├── correlation.rs   # Timeouts, ordering, single flight, stale replies
//!     └── framing.rs       # Frame reassembly on a live socket
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p hb-tests
//! cargo test -p hb-tests integration::correlation::
//! ```

#![allow(dead_code)]

#[cfg(test)]
pub mod fixtures;
pub mod integration;
