// Project/bucket identifier resolution for document tools
// Author: kelexine (https://github.com/kelexine)

use crate::cache::ResourceRepository;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Identifiers a document tool should use, plus any validation warnings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedScope {
    pub project_id: Option<String>,
    pub bucket_id: Option<String>,
    pub warnings: Vec<String>,
}

/// Read-only consumer of the metadata cache used by the document tools.
///
/// Unknown ids produce warnings rather than errors: the cache may simply be
/// behind GroundX, and the upstream call remains the final authority.
#[derive(Debug, Clone)]
pub struct ResourceResolver {
    repository: Arc<ResourceRepository>,
    default_bucket_id: Option<String>,
}

impl ResourceResolver {
    pub fn new(repository: Arc<ResourceRepository>, default_bucket_id: Option<String>) -> Self {
        Self {
            repository,
            default_bucket_id,
        }
    }

    pub fn resolve(&self, project_id: Option<&str>, bucket_id: Option<&str>) -> ResolvedScope {
        let mut scope = ResolvedScope {
            project_id: project_id.map(str::to_string),
            bucket_id: bucket_id
                .map(str::to_string)
                .or_else(|| self.default_bucket_id.clone()),
            warnings: Vec::new(),
        };

        // Nothing to validate against
        if !self.repository.is_enabled() || self.repository.list_all().project_count() == 0 {
            debug!("Metadata cache empty or disabled; skipping id validation");
            return scope;
        }

        match (scope.project_id.clone(), scope.bucket_id.clone()) {
            (Some(project_id), bucket_id) => {
                if self.repository.lookup_project(&project_id).is_none() {
                    scope.warn(format!(
                        "Project ID '{}' not found in cache. This might be due to an outdated cache or invalid ID.",
                        project_id
                    ));
                }
                if let Some(bucket_id) = bucket_id {
                    match self.repository.lookup_bucket(&bucket_id) {
                        None => scope.warn(format!(
                            "Bucket ID '{}' not found in project '{}' cache. This might be due to an outdated cache or invalid ID.",
                            bucket_id, project_id
                        )),
                        Some(bucket) if bucket.project_id != project_id => scope.warn(format!(
                            "Bucket ID '{}' belongs to project '{}', not '{}'.",
                            bucket_id, bucket.project_id, project_id
                        )),
                        Some(_) => {}
                    }
                }
            }
            (None, Some(bucket_id)) => match self.repository.lookup_bucket(&bucket_id) {
                Some(bucket) => scope.project_id = Some(bucket.project_id),
                None => scope.warn(format!(
                    "Bucket ID '{}' not found in any project's cache. Please specify a project ID for more accurate validation.",
                    bucket_id
                )),
            },
            (None, None) => {}
        }

        scope
    }
}

impl ResolvedScope {
    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }
}
