//! Prometheus metrics for the session exchange.
//!
//! This module provides:
//! - Session request/outcome counters
//! - Upstream call latency

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

use crate::error::FailureKind;

// === Metric Name Constants ===

/// Upstream session call latency metric name.
pub const METRIC_UPSTREAM_LATENCY: &str = "upstream_session_latency_ms";
/// Sessions requested counter metric name.
pub const METRIC_SESSIONS_REQUESTED: &str = "sessions_requested_total";
/// Sessions created counter metric name.
pub const METRIC_SESSIONS_CREATED: &str = "sessions_created_total";
/// Sessions failed counter metric name.
pub const METRIC_SESSIONS_FAILED: &str = "sessions_failed_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_UPSTREAM_LATENCY,
        "Upstream session creation latency in milliseconds"
    );

    describe_counter!(
        METRIC_SESSIONS_REQUESTED,
        "Total number of session requests received"
    );
    describe_counter!(
        METRIC_SESSIONS_CREATED,
        "Total number of ephemeral sessions created"
    );
    describe_counter!(
        METRIC_SESSIONS_FAILED,
        "Total number of session requests that failed"
    );

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder and return a handle for rendering.
pub fn install_prometheus() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Record upstream call latency.
pub fn record_upstream_latency(start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_UPSTREAM_LATENCY).record(latency_ms);
}

/// Increment sessions requested counter.
pub fn inc_sessions_requested() {
    counter!(METRIC_SESSIONS_REQUESTED).increment(1);
}

/// Increment sessions created counter.
pub fn inc_sessions_created() {
    counter!(METRIC_SESSIONS_CREATED).increment(1);
}

/// Increment sessions failed counter, labelled by failure kind.
pub fn inc_sessions_failed(kind: FailureKind) {
    let label: &'static str = kind.into();
    counter!(METRIC_SESSIONS_FAILED, "kind" => label).increment(1);
}
