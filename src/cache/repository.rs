// Resource repository - the in-memory project/bucket store
// Author: kelexine (https://github.com/kelexine)

use crate::cache::models::{Bucket, CacheSnapshot, Project};
use crate::cache::stats::{CacheStatistics, StatisticsTracker};
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Holds the current [`CacheSnapshot`] and the cache statistics.
///
/// Reads clone the snapshot `Arc` under a short read lock and never wait on
/// network I/O. Replacement swaps that single `Arc`, so a reader sees either
/// the old snapshot or the new one, never a mix of both.
#[derive(Debug)]
pub struct ResourceRepository {
    enabled: bool,
    ttl: Duration,
    snapshot: RwLock<Arc<CacheSnapshot>>,
    stats: StatisticsTracker,
}

impl ResourceRepository {
    /// Create an empty repository.
    pub fn new(enabled: bool, ttl: Duration) -> Self {
        Self {
            enabled,
            ttl,
            snapshot: RwLock::new(Arc::new(CacheSnapshot::empty(ttl))),
            stats: StatisticsTracker::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// TTL applied to snapshots built for this repository.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Find a project by id, counting a hit or a miss.
    pub fn lookup_project(&self, id: &str) -> Option<Project> {
        if !self.enabled {
            self.stats.record_miss();
            return None;
        }

        let found = self.current().project(id).cloned();
        self.record(found.is_some(), "project", id);
        found
    }

    /// Find a bucket by id, counting a hit or a miss.
    pub fn lookup_bucket(&self, id: &str) -> Option<Bucket> {
        if !self.enabled {
            self.stats.record_miss();
            return None;
        }

        let found = self.current().bucket(id).cloned();
        self.record(found.is_some(), "bucket", id);
        found
    }

    /// The current snapshot, for enumeration. Not counted as a lookup.
    pub fn list_all(&self) -> Arc<CacheSnapshot> {
        self.current()
    }

    pub fn is_stale(&self) -> bool {
        self.current().is_stale_at(Utc::now())
    }

    /// Atomically install `snapshot`, discarding the previous one.
    pub fn replace_snapshot(&self, snapshot: CacheSnapshot) {
        let snapshot = Arc::new(snapshot);
        crate::metrics::update_snapshot_size(snapshot.project_count(), snapshot.bucket_count());
        *self.snapshot.write() = snapshot;
        debug!("Metadata cache snapshot replaced");
    }

    pub fn statistics(&self) -> CacheStatistics {
        self.stats.snapshot()
    }

    pub(crate) fn stats(&self) -> &StatisticsTracker {
        &self.stats
    }

    fn current(&self) -> Arc<CacheSnapshot> {
        self.snapshot.read().clone()
    }

    fn record(&self, hit: bool, kind: &str, id: &str) {
        if hit {
            debug!("Cache hit: {} {}", kind, id);
            self.stats.record_hit();
        } else {
            debug!("Cache miss: {} {}", kind, id);
            self.stats.record_miss();
        }
    }
}
