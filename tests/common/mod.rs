// Shared test fixtures
// Author: kelexine (https://github.com/kelexine)

#![allow(dead_code)]

use async_trait::async_trait;
use gxtract::cache::{Bucket, MetadataProvider, Project};
use gxtract::error::{AppError, Result};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory provider whose upstream data can be changed between refreshes.
#[derive(Default)]
pub struct ScriptedProvider {
    projects: Mutex<Vec<Project>>,
    buckets: Mutex<HashMap<String, Vec<Bucket>>>,
    failing_listings: Mutex<HashSet<String>>,
    unavailable: Mutex<bool>,
    delay: Mutex<Option<Duration>>,
    pub project_calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(self, project: Project, buckets: Vec<Bucket>) -> Self {
        self.buckets.lock().insert(project.id.clone(), buckets);
        self.projects.lock().push(project);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock() = Some(delay);
        self
    }

    pub fn fail_listing_for(&self, project_id: &str) {
        self.failing_listings.lock().insert(project_id.to_string());
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock() = unavailable;
    }

    pub fn clear_projects(&self) {
        self.projects.lock().clear();
    }

    pub fn project_calls(&self) -> usize {
        self.project_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataProvider for ScriptedProvider {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.project_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.unavailable.lock() {
            return Err(AppError::ServiceUnavailable("GroundX is down".to_string()));
        }
        Ok(self.projects.lock().clone())
    }

    async fn list_buckets_for_project(&self, project_id: &str) -> Result<Vec<Bucket>> {
        if self.failing_listings.lock().contains(project_id) {
            return Err(AppError::GroundxApi(format!("HTTP 500: group {}", project_id)));
        }
        Ok(self
            .buckets
            .lock()
            .get(project_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// P1 owns B1 and B2; P2 owns nothing.
pub fn two_project_provider() -> ScriptedProvider {
    ScriptedProvider::new()
        .with_project(
            Project::new("P1", "Research"),
            vec![
                Bucket::new("B1", "Papers", "P1"),
                Bucket::new("B2", "Datasets", "P1"),
            ],
        )
        .with_project(Project::new("P2", "Archive"), vec![])
}
