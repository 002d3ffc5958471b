//! Refresh Job Metrics
//!
//! Prometheus metrics for the model refresh background job.

use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, HistogramVec,
    IntCounterVec, IntGauge,
};
use std::time::Duration;

static REFRESH_RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "reco_refresh_runs_total",
        "Total refresh cycles (refreshed/skipped/error)",
        &["status"]
    )
    .expect("Failed to register refresh runs metric")
});

static REFRESH_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "reco_refresh_duration_seconds",
        "Duration of refresh operations",
        &["operation"],
        vec![0.01, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0]
    )
    .expect("Failed to register refresh duration metric")
});

static INTERACTIONS_SEEN: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "reco_refresh_interactions_seen",
        "Interaction log size observed in the last staleness check"
    )
    .expect("Failed to register refresh interactions gauge")
});

/// Record refresh cycle result (refreshed/skipped/error).
pub fn record_refresh_run(status: &str) {
    REFRESH_RUNS_TOTAL.with_label_values(&[status]).inc();
}

/// Record refresh operation duration.
pub fn record_refresh_duration(operation: &str, duration: Duration) {
    REFRESH_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration.as_secs_f64());
}

/// Set interaction log size seen by the current staleness check.
pub fn set_interactions_seen(count: i64) {
    INTERACTIONS_SEEN.set(count);
}
