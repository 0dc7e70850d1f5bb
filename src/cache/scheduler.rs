// Periodic background refresh of the metadata cache
// Author: kelexine (https://github.com/kelexine)

use crate::cache::refresh::RefreshCoordinator;
use crate::error::RefreshError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Runs [`RefreshCoordinator::try_refresh`] on a fixed interval.
pub struct RefreshScheduler {
    coordinator: RefreshCoordinator,
    interval: Duration,
}

/// Handle to a running scheduler task.
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    ticks: Arc<AtomicU64>,
}

impl SchedulerHandle {
    /// Number of scheduled refreshes attempted so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Stop the loop and wait for it to exit. A refresh already running is
    /// left to finish on its own task.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            warn!("Refresh scheduler task ended abnormally: {}", e);
        }
    }
}

impl RefreshScheduler {
    pub fn new(coordinator: RefreshCoordinator, interval: Duration) -> Self {
        Self {
            coordinator,
            interval,
        }
    }

    /// Spawn the refresh loop. The first refresh happens one interval from
    /// now; startup population is the caller's job.
    pub fn spawn(self) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let ticks = Arc::new(AtomicU64::new(0));
        let task = tokio::spawn(self.run(shutdown_rx, ticks.clone()));

        SchedulerHandle {
            shutdown_tx,
            task,
            ticks,
        }
    }

    async fn run(self, mut shutdown_rx: watch::Receiver<bool>, ticks: Arc<AtomicU64>) {
        let period = if self.interval.is_zero() {
            warn!("Refresh interval of 0s is invalid; using 1s");
            Duration::from_secs(1)
        } else {
            self.interval
        };

        info!("Metadata refresh scheduled every {}s", period.as_secs());
        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval() fires immediately; skip that tick
        timer.tick().await;

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    ticks.fetch_add(1, Ordering::AcqRel);
                    match self.coordinator.try_refresh().await {
                        Ok(outcome) => debug!(
                            "Scheduled refresh cached {} projects",
                            outcome.project_count
                        ),
                        Err(RefreshError::ConcurrentRefreshInProgress) => {
                            info!("Skipping scheduled refresh: one is already in progress")
                        }
                        // Already logged by the coordinator
                        Err(_) => {}
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Metadata refresh scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::models::{Bucket, Project};
    use crate::cache::refresh::MetadataProvider;
    use crate::cache::repository::ResourceRepository;
    use async_trait::async_trait;

    struct OneProject;

    #[async_trait]
    impl MetadataProvider for OneProject {
        async fn list_projects(&self) -> crate::error::Result<Vec<Project>> {
            Ok(vec![Project::new("p1", "One")])
        }

        async fn list_buckets_for_project(&self, _id: &str) -> crate::error::Result<Vec<Bucket>> {
            Ok(vec![])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_refreshes_on_each_interval() {
        let repo = Arc::new(ResourceRepository::new(true, Duration::from_secs(3600)));
        let coordinator =
            RefreshCoordinator::new(repo.clone(), Arc::new(OneProject), Duration::from_secs(5));

        let handle = RefreshScheduler::new(coordinator, Duration::from_secs(60)).spawn();
        tokio::time::sleep(Duration::from_secs(150)).await;

        assert_eq!(handle.ticks(), 2);
        assert_eq!(repo.statistics().refresh_count, 2);
        assert_eq!(repo.statistics().refresh_success_count, 2);

        handle.shutdown().await;
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(repo.statistics().refresh_count, 2);
    }
}
