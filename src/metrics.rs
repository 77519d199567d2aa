//! Prometheus metrics for upstream latency and endpoint outcomes.
//!
//! Recording goes through the `metrics` facade, so nothing is collected
//! until [`init_metrics`] installs the Prometheus recorder. Tests never
//! install it and the macros are no-ops there.

use std::sync::OnceLock;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::debug;

use crate::error::AppError;

// === Metric Name Constants ===

/// Upstream request latency metric name.
pub const METRIC_UPSTREAM_LATENCY: &str = "upstream_request_latency_ms";
/// Upstream failures counter metric name.
pub const METRIC_UPSTREAM_FAILURES: &str = "upstream_failures_total";
/// `/api/aqi` requests counter metric name.
pub const METRIC_AQI_REQUESTS: &str = "aqi_requests_total";
/// `/api/search` requests counter metric name.
pub const METRIC_SEARCH_REQUESTS: &str = "search_requests_total";
/// Cities returned with a null AQI.
pub const METRIC_MISSING_AQI: &str = "aqi_missing_values_total";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder and register metric descriptions.
/// Call this once at startup.
pub fn init_metrics() -> Result<(), AppError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| AppError::Metrics(e.to_string()))?;

    if METRICS_HANDLE.set(handle).is_err() {
        return Err(AppError::Metrics("recorder already installed".to_string()));
    }

    describe_histogram!(
        METRIC_UPSTREAM_LATENCY,
        "Upstream HTTP request latency in milliseconds"
    );
    describe_counter!(
        METRIC_UPSTREAM_FAILURES,
        "Total number of failed upstream requests"
    );
    describe_counter!(METRIC_AQI_REQUESTS, "Total number of /api/aqi requests");
    describe_counter!(
        METRIC_SEARCH_REQUESTS,
        "Total number of /api/search requests"
    );
    describe_counter!(
        METRIC_MISSING_AQI,
        "Total number of results returned without an AQI value"
    );

    debug!("Metrics initialized");
    Ok(())
}

/// Current metrics in Prometheus text format.
pub fn render_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(PrometheusHandle::render)
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Record upstream request latency.
pub fn record_upstream_latency(start: Instant, endpoint: &'static str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_UPSTREAM_LATENCY, "endpoint" => endpoint).record(latency_ms);
}

/// Increment upstream failure counter.
pub fn inc_upstream_failures(endpoint: &'static str) {
    counter!(METRIC_UPSTREAM_FAILURES, "endpoint" => endpoint).increment(1);
}

/// Increment `/api/aqi` counter with its outcome.
pub fn inc_aqi_requests(outcome: &'static str) {
    counter!(METRIC_AQI_REQUESTS, "outcome" => outcome).increment(1);
}

/// Increment `/api/search` counter with its outcome.
pub fn inc_search_requests(outcome: &'static str) {
    counter!(METRIC_SEARCH_REQUESTS, "outcome" => outcome).increment(1);
}

/// Count results that came back without an AQI value.
pub fn inc_missing_aqi(count: u64) {
    if count > 0 {
        counter!(METRIC_MISSING_AQI).increment(count);
    }
}

/// RAII guard for timing an upstream call.
/// Records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    endpoint: &'static str,
}

impl LatencyTimer {
    /// Start timing a call to `endpoint`.
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            start: Instant::now(),
            endpoint,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_upstream_latency(self.start, self.endpoint);
    }
}
