//! # Metrics
//!
//! Prometheus export of guardian activity, served at `GET /metrics`.
//!
//! **Counters:**
//! - `guardian_restarts_total{node}` - Restart commands issued
//! - `guardian_alerts_total{kind}` - Alerts raised, by kind
//!
//! **Histograms:**
//! - `guardian_probe_latency_seconds{address}` - Probe round-trip time
//!
//! **Gauges:**
//! - `guardian_nodes{state}` - Nodes per health state
//! - `guardian_active` - 1 while automated actions are enabled

pub use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::fleet::{FleetSnapshot, NodeState};

/// Update fleet gauges from a snapshot.
pub fn record_snapshot(snapshot: &FleetSnapshot) {
    for state in NodeState::ALL {
        metrics::gauge!("guardian_nodes", "state" => state.as_str())
            .set(snapshot.count(state) as f64);
    }
    metrics::gauge!("guardian_active").set(if snapshot.guardian_active { 1.0 } else { 0.0 });
}

/// Initialize the Prometheus recorder with probe latency buckets.
///
/// Buckets span sub-millisecond LAN probes up to the longest sensible
/// probe timeout: [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1, 2.5, 5, 10, 30].
pub fn setup_metrics() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::Matcher;

    let latency_buckets = &[
        0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("guardian_probe_latency_seconds".to_string()),
            latency_buckets,
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Install the global recorder, or hand back a detached handle if one is
/// already installed (tests, repeated startup).
pub fn handle_or_detached() -> PrometheusHandle {
    setup_metrics().unwrap_or_else(|e| {
        tracing::debug!("Metrics already initialized, creating new handle: {}", e);
        PrometheusBuilder::new().build_recorder().handle()
    })
}
