//! # Host-Bridge Telemetry
//!
//! Ambient observability for both sides of the bridge.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` fmt layer with `EnvFilter`, plain or JSON
//! - **Diagnostic events**: [`EventLog`], the recorder that replies carry
//!   events in and the caller replays them into
//! - **Metrics**: Prometheus counters for transport, correlation, policy and
//!   transaction activity
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hb_telemetry::{init_tracing, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_tracing(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HB_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `HB_JSON_LOGS` | `false` | Emit JSON lines instead of text |
//! | `HB_SERVICE_NAME` | `host-bridge` | Service name attached to the init log |

#![cfg_attr(test, allow(clippy::unwrap_used))]

mod config;
mod event_log;
mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use event_log::EventLog;
pub use metrics::{
    gather_metrics, register_metrics, ELEMENTS_DELETED, PACKAGES_RECEIVED, PACKAGES_SENT,
    POLICY_DENIALS, REQUEST_TIMEOUTS, STALE_REPLIES, TRANSACTIONS_COMMITTED,
    TRANSACTIONS_ROLLED_BACK,
};
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

/// Convenience macro for adding to a counter.
#[macro_export]
macro_rules! metric_add {
    ($metric:expr, $value:expr) => {
        $metric.inc_by($value)
    };
    ($metric:expr, $labels:expr, $value:expr) => {
        $metric.with_label_values($labels).inc_by($value)
    };
}
