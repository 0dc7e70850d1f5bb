// Prometheus metrics registry and collectors
// Author: kelexine (https://github.com/kelexine)

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
    register_counter_vec_with_registry, register_gauge_vec_with_registry,
    register_histogram_vec_with_registry,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // REQUEST METRICS
    // ============================================================================

    /// Tool invocations over HTTP
    pub static ref TOOL_CALLS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("tool_calls_total", "Total tool invocations"),
        &["tool", "status"], // status: ok, error
        REGISTRY
    ).unwrap();

    // ============================================================================
    // CACHE METRICS
    // ============================================================================

    /// Targeted cache lookups
    pub static ref CACHE_LOOKUPS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("metadata_cache_lookups_total", "Total metadata cache lookups"),
        &["result"], // result: hit, miss
        REGISTRY
    ).unwrap();

    /// Completed refresh cycles
    pub static ref CACHE_REFRESHES: CounterVec = register_counter_vec_with_registry!(
        Opts::new("metadata_cache_refreshes_total", "Total metadata cache refreshes"),
        &["outcome"], // outcome: success, failure
        REGISTRY
    ).unwrap();

    /// Refresh cycle duration
    pub static ref CACHE_REFRESH_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        HistogramOpts::new("metadata_cache_refresh_duration_seconds", "Refresh cycle duration")
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["cache"],
        REGISTRY
    ).unwrap();

    /// Entries in the current snapshot
    pub static ref CACHE_ENTRIES: GaugeVec = register_gauge_vec_with_registry!(
        Opts::new("metadata_cache_entries", "Entries in the current metadata snapshot"),
        &["type"], // type: project, bucket
        REGISTRY
    ).unwrap();

    // ============================================================================
    // UPSTREAM METRICS
    // ============================================================================

    /// GroundX API calls
    pub static ref GROUNDX_API_CALLS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("groundx_api_calls_total", "Total GroundX API calls"),
        &["operation", "status_code"],
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
