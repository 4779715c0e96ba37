//! Prometheus metrics for Host-Bridge.
//!
//! All metrics follow the naming convention: `hb_<component>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // CHANNEL METRICS (hb-01)
    // =========================================================================

    /// Packages written to a channel
    pub static ref PACKAGES_SENT: IntCounterVec = IntCounterVec::new(
        Opts::new("hb_channel_packages_sent_total", "Packages written to a channel"),
        &["package_type"]
    ).expect("metric creation failed");

    /// Packages fully reassembled from a channel
    pub static ref PACKAGES_RECEIVED: IntCounterVec = IntCounterVec::new(
        Opts::new("hb_channel_packages_received_total", "Packages decoded from a channel"),
        &["package_type"]
    ).expect("metric creation failed");

    // =========================================================================
    // CORRELATION METRICS (hb-02)
    // =========================================================================

    /// Requests that got no reply within the max wait
    pub static ref REQUEST_TIMEOUTS: IntCounter = IntCounter::new(
        "hb_correlator_timeouts_total",
        "Requests abandoned after the max wait"
    ).expect("metric creation failed");

    /// Replies discarded because they answer no outstanding request
    pub static ref STALE_REPLIES: IntCounter = IntCounter::new(
        "hb_correlator_stale_replies_total",
        "Replies discarded for a mismatched request id"
    ).expect("metric creation failed");

    // =========================================================================
    // POLICY AND MUTATION METRICS (hb-03, hb-04)
    // =========================================================================

    /// Elements skipped by the write-access policy
    pub static ref POLICY_DENIALS: IntCounterVec = IntCounterVec::new(
        Opts::new("hb_policy_denials_total", "Elements skipped by the write-access policy"),
        &["rule"]  // rule: selection/workset
    ).expect("metric creation failed");

    /// Elements the host reported as deleted
    pub static ref ELEMENTS_DELETED: IntCounter = IntCounter::new(
        "hb_mutator_elements_deleted_total",
        "Elements removed by committed transactions"
    ).expect("metric creation failed");

    /// Committed transactions
    pub static ref TRANSACTIONS_COMMITTED: IntCounter = IntCounter::new(
        "hb_mutator_transactions_committed_total",
        "Committed document transactions"
    ).expect("metric creation failed");

    /// Rolled back transactions
    pub static ref TRANSACTIONS_ROLLED_BACK: IntCounter = IntCounter::new(
        "hb_mutator_transactions_rolled_back_total",
        "Rolled back document transactions"
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once: metrics that are already registered are
/// skipped.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Channel
        Box::new(PACKAGES_SENT.clone()),
        Box::new(PACKAGES_RECEIVED.clone()),
        // Correlation
        Box::new(REQUEST_TIMEOUTS.clone()),
        Box::new(STALE_REPLIES.clone()),
        // Policy and mutation
        Box::new(POLICY_DENIALS.clone()),
        Box::new(ELEMENTS_DELETED.clone()),
        Box::new(TRANSACTIONS_COMMITTED.clone()),
        Box::new(TRANSACTIONS_ROLLED_BACK.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    register_metrics()?;

    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_twice() {
        assert!(register_metrics().is_ok());
        assert!(register_metrics().is_ok());
    }

    #[test]
    fn test_counter_increment() {
        REQUEST_TIMEOUTS.inc();
        assert!(REQUEST_TIMEOUTS.get() >= 1);
    }

    #[test]
    fn test_gather_contains_counters() {
        TRANSACTIONS_COMMITTED.inc();
        POLICY_DENIALS.with_label_values(&["workset"]).inc();
        let text = gather_metrics().unwrap();
        assert!(text.contains("hb_mutator_transactions_committed_total"));
        assert!(text.contains("hb_policy_denials_total"));
    }
}
