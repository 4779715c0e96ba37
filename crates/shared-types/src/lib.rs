//! # Shared Types Crate
//!
//! Types exchanged between the automation process and the document host.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every cross-crate type is defined here.
//! - **Package Integrity**: the `MessagePackage` is the sole unit on the wire
//!   and cannot be mutated once built.
//! - **Open by Default**: every policy and settings field defaults to the
//!   unrestricted value.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod events;
pub mod ipc;
pub mod settings;

pub use entities::*;
pub use envelope::{MessagePackage, RequestId, PROTOCOL_VERSION};
pub use errors::*;
pub use events::{EventLevel, EventRecord, EventRecorder};
pub use ipc::*;
pub use settings::*;
