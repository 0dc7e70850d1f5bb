// GroundX API client - metadata provider for the cache
// Author: kelexine (https://github.com/kelexine)

use super::{parse_buckets, parse_groups, GroupListResponse, GroupResponse};
use crate::cache::{Bucket, MetadataProvider, Project};
use crate::config::GroundxConfig;
use crate::error::{AppError, Result};
use crate::utils::logging::sanitize;
use crate::utils::retry::{parse_retry_after, with_retry, UpstreamFailure};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error};

/// Client for the GroundX REST API.
///
/// Only the metadata endpoints the cache needs are implemented: listing
/// groups (projects) and reading one group with its buckets.
pub struct GroundxClient {
    http_client: Client,
    config: GroundxConfig,
    /// Buckets embedded in the last group listing, keyed by group id.
    /// Consumed by `list_buckets_for_project` instead of a per-group request.
    listed_buckets: Mutex<HashMap<String, Vec<Bucket>>>,
}

impl GroundxClient {
    /// Create a new GroundX client.
    ///
    /// A missing API key is not an error here; every call reports
    /// [`AppError::MissingApiKey`] instead, so the server can still start.
    pub fn new(config: &GroundxConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .use_rustls_tls()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config: config.clone(),
            listed_buckets: Mutex::new(HashMap::new()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.api_base_url
    }

    /// Build an endpoint URL under the base URL. Each segment is
    /// percent-encoded, so ids cannot change the route.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.api_base_url).map_err(|e| {
            AppError::Config(format!(
                "Invalid GroundX base URL '{}': {}",
                self.config.api_base_url, e
            ))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                AppError::Config(format!(
                    "GroundX base URL '{}' cannot have a path",
                    self.config.api_base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET `url` and decode the JSON body, retrying transient failures.
    async fn get_json<T: DeserializeOwned>(&self, operation: &str, url: Url) -> Result<T> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(AppError::MissingApiKey)?;
        debug!("GroundX {} -> GET {}", operation, url);

        let body = with_retry(operation, self.config.max_retries, || async {
            let response = self
                .http_client
                .get(url.clone())
                .header("X-API-Key", api_key)
                .header("Accept", "application/json")
                .send()
                .await
                .map_err(|e| UpstreamFailure::new(500, format!("HTTP error: {}", e)))?;

            let status = response.status();
            crate::metrics::record_groundx_call(operation, status.as_u16());

            if !status.is_success() {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(parse_retry_after);
                let text = response.text().await.unwrap_or_default();
                return Err(UpstreamFailure {
                    status: status.as_u16(),
                    body: sanitize(&text),
                    retry_after,
                });
            }

            response
                .text()
                .await
                .map_err(|e| UpstreamFailure::new(500, format!("Failed to read body: {}", e)))
        })
        .await
        .map_err(|failure| {
            error!(
                "GroundX {} failed: HTTP {} - {}",
                operation, failure.status, failure.body
            );
            match failure.status {
                401 | 403 => AppError::Unauthorized(failure.body),
                429 => AppError::TooManyRequests(failure.body),
                503 | 504 => AppError::ServiceUnavailable(failure.body),
                status => AppError::GroundxApi(format!("HTTP {}: {}", status, failure.body)),
            }
        })?;

        serde_json::from_str(&body)
            .map_err(|e| AppError::InvalidResponse(format!("{} returned unexpected JSON: {}", operation, e)))
    }
}

#[async_trait]
impl MetadataProvider for GroundxClient {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        let url = self.endpoint(&["v1", "group"])?;
        let response: GroupListResponse = self.get_json("list_groups", url).await?;

        let mut listed = self.listed_buckets.lock();
        listed.clear();
        Ok(parse_groups(response.groups)
            .into_iter()
            .map(|(project, buckets)| {
                if !buckets.is_empty() {
                    listed.insert(project.id.clone(), buckets);
                }
                project
            })
            .collect())
    }

    async fn list_buckets_for_project(&self, project_id: &str) -> Result<Vec<Bucket>> {
        let listed = self.listed_buckets.lock().remove(project_id);
        if let Some(buckets) = listed {
            debug!(
                "Using {} buckets from the group listing for project {}",
                buckets.len(),
                project_id
            );
            return Ok(buckets);
        }

        let url = self.endpoint(&["v1", "group", project_id])?;
        let response: GroupResponse = self.get_json("get_group", url).await?;

        let buckets = response
            .group
            .get("buckets")
            .and_then(|b| b.as_array())
            .cloned()
            .unwrap_or_default();
        Ok(parse_buckets(project_id, buckets))
    }
}
