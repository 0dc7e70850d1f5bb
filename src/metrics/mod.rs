// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

pub use registry::{
    gather_metrics,
    CACHE_ENTRIES,
    CACHE_LOOKUPS,
    CACHE_REFRESHES,
    CACHE_REFRESH_DURATION,
    GROUNDX_API_CALLS,
    TOOL_CALLS,
};

/// Helper to record a targeted cache lookup (`hit` or `miss`)
pub fn record_cache_lookup(result: &str) {
    CACHE_LOOKUPS.with_label_values(&[result]).inc();
}

/// Helper to record a completed refresh (`success` or `failure`)
pub fn record_refresh(outcome: &str) {
    CACHE_REFRESHES.with_label_values(&[outcome]).inc();
}

pub fn observe_refresh_duration(duration_secs: f64) {
    CACHE_REFRESH_DURATION
        .with_label_values(&["metadata"])
        .observe(duration_secs);
}

pub fn update_snapshot_size(projects: usize, buckets: usize) {
    CACHE_ENTRIES.with_label_values(&["project"]).set(projects as f64);
    CACHE_ENTRIES.with_label_values(&["bucket"]).set(buckets as f64);
}

/// Helper to record GroundX API call metrics
pub fn record_groundx_call(operation: &str, status_code: u16) {
    GROUNDX_API_CALLS
        .with_label_values(&[operation, &status_code.to_string()])
        .inc();
}

/// Helper to record tool invocations
pub fn record_tool_call(tool: &str, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    TOOL_CALLS.with_label_values(&[tool, status]).inc();
}
