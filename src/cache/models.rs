//! Cache records, the snapshot container, and refresh outcomes.

// Author: kelexine (https://github.com/kelexine)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

/// A GroundX project (a "group" in the GroundX API).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Buckets owned by this project, in upstream order.
    #[serde(default)]
    pub bucket_ids: Vec<String>,
}

/// A GroundX bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub id: String,
    pub name: String,
    /// Owning project. Lookup only; ownership lives in `Project::bucket_ids`.
    pub project_id: String,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bucket_ids: Vec::new(),
        }
    }
}

impl Bucket {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            project_id: project_id.into(),
        }
    }
}

/// Readiness of the metadata cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    /// No refresh has been attempted yet.
    Uninitialized,
    /// The first refresh is running.
    Populating,
    /// The last completed refresh succeeded.
    Ready,
    /// The last completed refresh failed; lookups still work on whatever is cached.
    Degraded,
}

/// An immutable, internally consistent view of every cached project and bucket.
///
/// Snapshots are never mutated after construction. The repository swaps whole
/// snapshots, so readers holding an `Arc<CacheSnapshot>` keep a stable view.
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    projects: Vec<Project>,
    project_index: HashMap<String, usize>,
    buckets: HashMap<String, Bucket>,
    acquired_at: Option<DateTime<Utc>>,
    ttl: Duration,
}

impl CacheSnapshot {
    /// The snapshot a process starts with: nothing cached, never acquired.
    pub fn empty(ttl: Duration) -> Self {
        Self {
            projects: Vec::new(),
            project_index: HashMap::new(),
            buckets: HashMap::new(),
            acquired_at: None,
            ttl,
        }
    }

    /// Assemble a snapshot from upstream projects and their bucket listings.
    ///
    /// Entries with empty ids, repeated project ids, and bucket ids already
    /// claimed by an earlier project are dropped with a warning. Each kept
    /// bucket is re-pointed at the project it was listed under.
    pub fn build(
        entries: Vec<(Project, Vec<Bucket>)>,
        ttl: Duration,
        acquired_at: DateTime<Utc>,
    ) -> Self {
        let mut projects = Vec::with_capacity(entries.len());
        let mut project_index = HashMap::with_capacity(entries.len());
        let mut buckets: HashMap<String, Bucket> = HashMap::new();

        for (mut project, project_buckets) in entries {
            if project.id.is_empty() {
                warn!("Skipping project with empty id (name: {:?})", project.name);
                continue;
            }
            if project_index.contains_key(&project.id) {
                warn!("Skipping duplicate project id {}", project.id);
                continue;
            }

            project.bucket_ids.clear();
            for mut bucket in project_buckets {
                if bucket.id.is_empty() {
                    warn!("Skipping bucket with empty id in project {}", project.id);
                    continue;
                }
                if let Some(existing) = buckets.get(&bucket.id) {
                    warn!(
                        "Bucket {} listed under project {} is already owned by project {}; skipping",
                        bucket.id, project.id, existing.project_id
                    );
                    continue;
                }
                bucket.project_id = project.id.clone();
                project.bucket_ids.push(bucket.id.clone());
                buckets.insert(bucket.id.clone(), bucket);
            }

            project_index.insert(project.id.clone(), projects.len());
            projects.push(project);
        }

        Self {
            projects,
            project_index,
            buckets,
            acquired_at: Some(acquired_at),
            ttl,
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.project_index.get(id).map(|&i| &self.projects[i])
    }

    pub fn bucket(&self, id: &str) -> Option<&Bucket> {
        self.buckets.get(id)
    }

    /// Buckets of `project` in their upstream order.
    pub fn buckets_of<'a>(&'a self, project: &'a Project) -> impl Iterator<Item = &'a Bucket> + 'a {
        project
            .bucket_ids
            .iter()
            .filter_map(move |id| self.buckets.get(id))
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn acquired_at(&self) -> Option<DateTime<Utc>> {
        self.acquired_at
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// True when `now - acquired_at > ttl`. An age of exactly `ttl` is still fresh.
    /// A snapshot that was never acquired is always stale.
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        let Some(acquired_at) = self.acquired_at else {
            return true;
        };
        match chrono::Duration::from_std(self.ttl) {
            Ok(ttl) => now.signed_duration_since(acquired_at) > ttl,
            // A TTL too large for chrono never expires
            Err(_) => false,
        }
    }

    /// Compare cached contents, ignoring acquisition time and TTL.
    pub fn same_contents(&self, other: &CacheSnapshot) -> bool {
        self.projects == other.projects && self.buckets == other.buckets
    }
}

/// Result of a completed refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOutcome {
    pub project_count: usize,
    pub bucket_count: usize,
    /// Projects whose bucket listing failed; cached with zero buckets.
    pub failed_projects: Vec<String>,
    pub refreshed_at: DateTime<Utc>,
    /// Set when this caller joined a refresh another caller started.
    pub coalesced: bool,
}
