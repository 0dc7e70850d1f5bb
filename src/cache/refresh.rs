// Refresh coordinator - single-flight snapshot rebuilds from GroundX
// Author: kelexine (https://github.com/kelexine)

use crate::cache::models::{Bucket, CacheSnapshot, CacheState, Project, RefreshOutcome};
use crate::cache::repository::ResourceRepository;
use crate::error::{RefreshError, Result};
use async_trait::async_trait;
use chrono::Utc;
use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub type RefreshResult = std::result::Result<RefreshOutcome, RefreshError>;

type SharedRefresh = Shared<BoxFuture<'static, RefreshResult>>;

/// Upstream source of project and bucket metadata.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<Project>>;

    async fn list_buckets_for_project(&self, project_id: &str) -> Result<Vec<Bucket>>;
}

/// Rebuilds the repository snapshot from a [`MetadataProvider`].
///
/// Both the background scheduler and manual refresh tools go through
/// [`RefreshCoordinator::refresh`]. At most one fetch cycle runs at a time:
/// callers arriving while a cycle is in flight await that cycle and receive
/// its result (marked `coalesced`). Cycles run on their own task, so dropping
/// a caller's future never cancels the upstream fetch.
#[derive(Clone)]
pub struct RefreshCoordinator {
    repository: Arc<ResourceRepository>,
    provider: Arc<dyn MetadataProvider>,
    fetch_timeout: Duration,
    in_flight: Arc<Mutex<Option<SharedRefresh>>>,
    state: Arc<RwLock<CacheState>>,
}

/// Clears the in-flight slot when a cycle ends, including by panic.
struct InFlightGuard(Arc<Mutex<Option<SharedRefresh>>>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.lock().take();
    }
}

impl RefreshCoordinator {
    pub fn new(
        repository: Arc<ResourceRepository>,
        provider: Arc<dyn MetadataProvider>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            provider,
            fetch_timeout,
            in_flight: Arc::new(Mutex::new(None)),
            state: Arc::new(RwLock::new(CacheState::Uninitialized)),
        }
    }

    pub fn repository(&self) -> &Arc<ResourceRepository> {
        &self.repository
    }

    pub fn state(&self) -> CacheState {
        *self.state.read()
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.lock().is_some()
    }

    /// Refresh the cache, joining a cycle that is already running.
    pub async fn refresh(&self) -> RefreshResult {
        if !self.repository.is_enabled() {
            return Err(RefreshError::Disabled);
        }

        let (cycle, joined) = {
            let mut slot = self.in_flight.lock();
            match slot.as_ref() {
                Some(cycle) => (cycle.clone(), true),
                None => {
                    let cycle = self.start_cycle();
                    *slot = Some(cycle.clone());
                    (cycle, false)
                }
            }
        };

        if joined {
            info!("Metadata refresh already in progress; waiting for it to finish");
        }

        let result = cycle.await;
        if joined {
            result.map(|outcome| RefreshOutcome {
                coalesced: true,
                ..outcome
            })
        } else {
            result
        }
    }

    /// Refresh the cache unless a cycle is already running.
    ///
    /// Returns [`RefreshError::ConcurrentRefreshInProgress`] instead of waiting.
    pub async fn try_refresh(&self) -> RefreshResult {
        if !self.repository.is_enabled() {
            return Err(RefreshError::Disabled);
        }

        let cycle = {
            let mut slot = self.in_flight.lock();
            if slot.is_some() {
                return Err(RefreshError::ConcurrentRefreshInProgress);
            }
            let cycle = self.start_cycle();
            *slot = Some(cycle.clone());
            cycle
        };

        cycle.await
    }

    // Must be called with the in-flight slot locked.
    fn start_cycle(&self) -> SharedRefresh {
        let this = self.clone();
        let handle = tokio::spawn(async move {
            let _guard = InFlightGuard(this.in_flight.clone());
            this.run_cycle().await
        });

        async move {
            handle
                .await
                .unwrap_or_else(|e| Err(RefreshError::Internal(e.to_string())))
        }
        .boxed()
        .shared()
    }

    async fn run_cycle(&self) -> RefreshResult {
        let stats = self.repository.stats();
        stats.record_refresh_attempt();
        {
            let mut state = self.state.write();
            if *state == CacheState::Uninitialized {
                *state = CacheState::Populating;
            }
        }

        info!("Refreshing GroundX metadata cache...");
        let started = Instant::now();
        let fetched = match tokio::time::timeout(self.fetch_timeout, self.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(RefreshError::UpstreamUnavailable(format!(
                "metadata fetch timed out after {}s",
                self.fetch_timeout.as_secs()
            ))),
        };
        crate::metrics::observe_refresh_duration(started.elapsed().as_secs_f64());

        match fetched {
            Ok((entries, failed_projects)) => {
                let refreshed_at = Utc::now();
                let snapshot = CacheSnapshot::build(entries, self.repository.ttl(), refreshed_at);
                let outcome = RefreshOutcome {
                    project_count: snapshot.project_count(),
                    bucket_count: snapshot.bucket_count(),
                    failed_projects,
                    refreshed_at,
                    coalesced: false,
                };

                self.repository.replace_snapshot(snapshot);
                stats.record_refresh_success();
                *self.state.write() = CacheState::Ready;

                info!(
                    "GroundX metadata cache refreshed: {} projects, {} buckets in {}ms",
                    outcome.project_count,
                    outcome.bucket_count,
                    started.elapsed().as_millis()
                );
                if !outcome.failed_projects.is_empty() {
                    warn!(
                        "Bucket listing failed for {} project(s): {:?}",
                        outcome.failed_projects.len(),
                        outcome.failed_projects
                    );
                }
                Ok(outcome)
            }
            Err(err) => {
                match &err {
                    RefreshError::EmptyUpstreamResult => {
                        warn!("GroundX returned no projects; keeping the current snapshot")
                    }
                    _ => error!("GroundX metadata refresh failed: {}", err),
                }
                stats.record_refresh_failure();
                *self.state.write() = CacheState::Degraded;
                Err(err)
            }
        }
    }

    /// Fetch every project and its buckets. A failed bucket listing keeps the
    /// project with no buckets and reports its id.
    async fn fetch(
        &self,
    ) -> std::result::Result<(Vec<(Project, Vec<Bucket>)>, Vec<String>), RefreshError> {
        let projects = self.provider.list_projects().await?;
        if projects.is_empty() {
            return Err(RefreshError::EmptyUpstreamResult);
        }
        debug!("Fetched {} projects, listing buckets", projects.len());

        let listings = join_all(
            projects
                .iter()
                .map(|p| self.provider.list_buckets_for_project(&p.id)),
        )
        .await;

        let mut failed = Vec::new();
        let entries = projects
            .into_iter()
            .zip(listings)
            .map(|(project, listing)| match listing {
                Ok(buckets) => (project, buckets),
                Err(e) => {
                    warn!(
                        "Error listing buckets for project {} ({}): {}",
                        project.name, project.id, e
                    );
                    failed.push(project.id.clone());
                    (project, Vec::new())
                }
            })
            .collect();

        Ok((entries, failed))
    }
}
