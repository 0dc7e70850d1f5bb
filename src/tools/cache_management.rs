//! Cache management tools.
//!
//! These are the operations exposed to tool callers for inspecting and
//! refreshing the GroundX metadata cache. Every operation returns a
//! structured value; refresh failures are reported in the result, never
//! raised.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::cache::{CacheState, CacheStatistics, RefreshCoordinator};
use crate::error::RefreshError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// Response of `getCacheStatistics`.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatisticsReport {
    pub statistics: StatisticsView,
}

/// Cache counters plus derived rates (percentages).
#[derive(Debug, Clone, Serialize)]
pub struct StatisticsView {
    #[serde(flatten)]
    pub counters: CacheStatistics,
    pub hit_rate: f64,
    pub refresh_success_rate: f64,
}

/// Response of `listCachedResources`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedResources {
    pub projects: Vec<ProjectView>,
    pub last_refreshed: Option<DateTime<Utc>>,
    pub state: CacheState,
    pub stale: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectView {
    pub id: String,
    pub name: String,
    pub buckets: Vec<BucketView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketView {
    pub id: String,
    pub name: String,
}

/// Response of `refreshMetadataCache` and `refreshCachedResources`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    pub success: bool,
    pub message: String,
    /// Failure detail when `success` is false.
    pub error: Option<String>,
    pub last_refreshed: Option<DateTime<Utc>>,
    pub project_count: usize,
    /// Projects cached without buckets because their listing failed.
    pub failed_projects: Vec<String>,
    /// True when this call joined a refresh that was already running.
    pub coalesced: bool,
}

/// The cache tool set, bound to one coordinator (and through it, one repository).
#[derive(Clone)]
pub struct CacheTools {
    coordinator: RefreshCoordinator,
}

impl CacheTools {
    pub fn new(coordinator: RefreshCoordinator) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    pub fn get_cache_statistics(&self) -> CacheStatisticsReport {
        info!("Cache statistics requested");
        let counters = self.coordinator.repository().statistics();

        CacheStatisticsReport {
            statistics: StatisticsView {
                hit_rate: counters.hit_rate(),
                refresh_success_rate: counters.refresh_success_rate(),
                counters,
            },
        }
    }

    pub fn list_cached_resources(&self) -> CachedResources {
        let repository = self.coordinator.repository();
        let snapshot = repository.list_all();

        let projects = snapshot
            .projects()
            .iter()
            .map(|project| ProjectView {
                id: project.id.clone(),
                name: project.name.clone(),
                buckets: snapshot
                    .buckets_of(project)
                    .map(|b| BucketView {
                        id: b.id.clone(),
                        name: b.name.clone(),
                    })
                    .collect(),
            })
            .collect();

        CachedResources {
            projects,
            last_refreshed: snapshot.acquired_at(),
            state: self.coordinator.state(),
            stale: snapshot.is_stale_at(Utc::now()),
        }
    }

    pub async fn refresh_metadata_cache(&self) -> RefreshReport {
        info!("Manual cache refresh requested");
        self.refresh().await
    }

    /// Same as [`CacheTools::refresh_metadata_cache`], under the resources-tool name.
    pub async fn refresh_cached_resources(&self) -> RefreshReport {
        info!("Manual refresh of cached resources requested");
        self.refresh().await
    }

    async fn refresh(&self) -> RefreshReport {
        let result = self.coordinator.refresh().await;
        let snapshot = self.coordinator.repository().list_all();

        match result {
            Ok(outcome) => RefreshReport {
                success: true,
                message: "Cache refresh completed successfully".to_string(),
                error: None,
                last_refreshed: Some(outcome.refreshed_at),
                project_count: outcome.project_count,
                failed_projects: outcome.failed_projects,
                coalesced: outcome.coalesced,
            },
            Err(err) => {
                let message = match err {
                    RefreshError::Disabled => "Metadata cache is disabled".to_string(),
                    _ => "Cache refresh failed - check server logs for details".to_string(),
                };
                if err.is_failure() {
                    warn!("{}: {}", message, err);
                } else {
                    info!("{}: {}", message, err);
                }
                RefreshReport {
                    success: false,
                    message,
                    error: Some(err.to_string()),
                    last_refreshed: snapshot.acquired_at(),
                    project_count: snapshot.project_count(),
                    failed_projects: Vec::new(),
                    coalesced: false,
                }
            }
        }
    }
}
