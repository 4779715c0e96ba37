//! # Adapter Runtime
//!
//! Both ends of a Host-Bridge session.
//!
//! ## Caller Side
//!
//! ```text
//! AdapterSession ──► RequestCorrelator ──► push channel ─────► host
//!       ▲                    ▲
//!       └── plain results    └── pull channel sink ◄──────── host replies
//! ```
//!
//! ## Host Side
//!
//! `HostListener` feeds requests, one at a time, to a `PackageHandler`.
//! `Dispatcher` is the reference handler: it runs the write-access policy and
//! the transactional mutator against a shared `HostDocument`.
//!
//! ## Startup Order
//!
//! 1. Caller pull channel listens.
//! 2. Host listener starts and knows the pull address.
//! 3. Caller push channel connects to the host listener (lazily).

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod dispatcher;
pub mod listener;
pub mod session;

pub use config::{apply_overrides, load_settings};
pub use dispatcher::Dispatcher;
pub use listener::{HostListener, PackageHandler};
pub use session::AdapterSession;

use anyhow::Context;
use hb_telemetry::{init_tracing, register_metrics, TelemetryConfig};

/// Install logging and register metrics for one side of the bridge
/// (`caller` or `host`).
pub fn init_telemetry(side: &str) -> anyhow::Result<()> {
    let config = TelemetryConfig::for_side(side);
    init_tracing(&config).context("tracing setup failed")?;
    register_metrics().context("metrics registration failed")?;
    Ok(())
}
