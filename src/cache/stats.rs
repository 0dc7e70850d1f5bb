//! Hit/miss and refresh accounting for the metadata cache.

// Author: kelexine (https://github.com/kelexine)

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

/// Point-in-time copy of the cache counters.
///
/// Counters only grow; nothing resets them short of a process restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStatistics {
    pub hits: u64,
    pub misses: u64,
    pub refresh_count: u64,
    pub refresh_success_count: u64,
    pub refresh_failure_count: u64,
    pub last_hit_time: Option<DateTime<Utc>>,
    pub last_miss_time: Option<DateTime<Utc>>,
    pub last_refresh_time: Option<DateTime<Utc>>,
}

impl CacheStatistics {
    /// Percentage of lookups that hit, rounded to two decimals.
    pub fn hit_rate(&self) -> f64 {
        percentage(self.hits, self.hits + self.misses)
    }

    /// Percentage of refresh attempts that succeeded, rounded to two decimals.
    pub fn refresh_success_rate(&self) -> f64 {
        percentage(self.refresh_success_count, self.refresh_count)
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = part as f64 / total as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

/// Thread-safe recorder behind [`CacheStatistics`].
#[derive(Debug, Default)]
pub struct StatisticsTracker {
    inner: Mutex<CacheStatistics>,
}

impl StatisticsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        let mut stats = self.inner.lock();
        stats.hits += 1;
        stats.last_hit_time = Some(Utc::now());
        crate::metrics::record_cache_lookup("hit");
    }

    pub fn record_miss(&self) {
        let mut stats = self.inner.lock();
        stats.misses += 1;
        stats.last_miss_time = Some(Utc::now());
        crate::metrics::record_cache_lookup("miss");
    }

    /// Counts a fetch cycle as started.
    pub fn record_refresh_attempt(&self) {
        self.inner.lock().refresh_count += 1;
    }

    pub fn record_refresh_success(&self) {
        let mut stats = self.inner.lock();
        stats.refresh_success_count += 1;
        stats.last_refresh_time = Some(Utc::now());
        crate::metrics::record_refresh("success");
    }

    pub fn record_refresh_failure(&self) {
        let mut stats = self.inner.lock();
        stats.refresh_failure_count += 1;
        stats.last_refresh_time = Some(Utc::now());
        crate::metrics::record_refresh("failure");
    }

    pub fn snapshot(&self) -> CacheStatistics {
        self.inner.lock().clone()
    }
}
