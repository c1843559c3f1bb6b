//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the logfetch server:
//! - HTTP request metrics (latency, counts, errors)
//! - Job submission and status metrics (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry, TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "logfetch_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("logfetch_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "logfetch_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Authentication failures.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "logfetch_auth_failures_total",
            "Total authentication failures",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Job Metrics
// =============================================================================

/// Jobs submitted since startup.
pub static JOBS_SUBMITTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "logfetch_jobs_submitted_total",
        "Total jobs submitted since startup",
    )
    .unwrap()
});

/// Jobs by current status (collected dynamically).
pub static JOBS_BY_STATUS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("logfetch_jobs_by_status", "Current job count by status"),
        &["status"],
    )
    .unwrap()
});

/// Archive downloads served.
pub static ARCHIVE_DOWNLOADS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "logfetch_archive_downloads_total",
        "Total archive downloads served since startup",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
        .unwrap();

    // Jobs
    registry
        .register(Box::new(JOBS_SUBMITTED_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(JOBS_BY_STATUS.clone()))
        .unwrap();
    registry
        .register(Box::new(ARCHIVE_DOWNLOADS_TOTAL.clone()))
        .unwrap();
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// This is called before encoding metrics to update the per-status gauges
/// with current values from the job registry.
pub fn collect_job_metrics(state: &crate::state::AppState) {
    let counts = state.registry().status_counts();
    JOBS_BY_STATUS
        .with_label_values(&["running"])
        .set(counts.running as i64);
    JOBS_BY_STATUS
        .with_label_values(&["completed"])
        .set(counts.completed as i64);
    JOBS_BY_STATUS
        .with_label_values(&["failed"])
        .set(counts.failed as i64);
}

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    // Replace UUIDs, archive filenames and numeric segments with placeholders
    let uuid_regex = regex_lite::Regex::new(
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
    )
    .unwrap();
    let archive_regex = regex_lite::Regex::new(r"/[^/]+\.tar\.gz(/|$)").unwrap();
    let numeric_regex = regex_lite::Regex::new(r"/\d+(/|$)").unwrap();

    let result = uuid_regex.replace_all(path, "{id}");
    let result = archive_regex.replace_all(&result, "/{filename}$1");
    let result = numeric_regex.replace_all(&result, "/{id}$1");
    result.to_string()
}
