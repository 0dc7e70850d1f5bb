// HTTP request handlers
// Author: kelexine (https://github.com/kelexine)

use super::routes::AppState;
use crate::cache::CacheState;
use crate::metrics::{gather_metrics, record_tool_call};
use crate::tools::{CacheStatisticsReport, CachedResources, RefreshReport, ResolvedScope};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: HashMap<String, HealthCheck>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub message: String,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut checks = HashMap::new();
    let mut overall_status = HealthStatus::Healthy;

    // Check metadata cache
    let coordinator = state.tools.coordinator();
    let repository = coordinator.repository();
    let cache_check = if !repository.is_enabled() {
        HealthCheck {
            status: "ok".to_string(),
            message: "Metadata cache disabled".to_string(),
        }
    } else {
        let snapshot = repository.list_all();
        match coordinator.state() {
            CacheState::Ready if !repository.is_stale() => HealthCheck {
                status: "ok".to_string(),
                message: format!(
                    "{} projects, {} buckets cached",
                    snapshot.project_count(),
                    snapshot.bucket_count()
                ),
            },
            CacheState::Ready => {
                overall_status = HealthStatus::Degraded;
                HealthCheck {
                    status: "warning".to_string(),
                    message: "Snapshot is older than its TTL".to_string(),
                }
            }
            CacheState::Degraded => {
                overall_status = HealthStatus::Degraded;
                HealthCheck {
                    status: "warning".to_string(),
                    message: format!(
                        "Last refresh failed; serving {} projects from the previous snapshot",
                        snapshot.project_count()
                    ),
                }
            }
            other => {
                overall_status = HealthStatus::Degraded;
                HealthCheck {
                    status: "warning".to_string(),
                    message: format!("Cache state: {:?}", other),
                }
            }
        }
    };
    checks.insert("metadata_cache".to_string(), cache_check);

    // Check credentials
    let credentials_check = if state.config.groundx.api_key.as_deref().unwrap_or("").is_empty() {
        overall_status = HealthStatus::Unhealthy;
        HealthCheck {
            status: "error".to_string(),
            message: "GROUNDX_API_KEY is not set".to_string(),
        }
    } else {
        HealthCheck {
            status: "ok".to_string(),
            message: "API key configured".to_string(),
        }
    };
    checks.insert("groundx_credentials".to_string(), credentials_check);

    // Check configuration
    let config_check = HealthCheck {
        status: "ok".to_string(),
        message: format!("API base: {}", state.config.groundx.api_base_url),
    };
    checks.insert("configuration".to_string(), config_check);

    Json(HealthResponse {
        status: overall_status,
        checks,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Prometheus text exposition
pub async fn metrics_handler() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(),
    )
        .into_response()
}

pub async fn cache_statistics_handler(State(state): State<AppState>) -> Json<CacheStatisticsReport> {
    record_tool_call("cache_getCacheStatistics", true);
    Json(state.tools.get_cache_statistics())
}

pub async fn list_cached_resources_handler(State(state): State<AppState>) -> Json<CachedResources> {
    record_tool_call("cache_listCachedResources", true);
    Json(state.tools.list_cached_resources())
}

pub async fn refresh_metadata_cache_handler(State(state): State<AppState>) -> Json<RefreshReport> {
    let report = state.tools.refresh_metadata_cache().await;
    record_tool_call("cache_refreshMetadataCache", report.success);
    Json(report)
}

pub async fn refresh_cached_resources_handler(
    State(state): State<AppState>,
) -> Json<RefreshReport> {
    let report = state.tools.refresh_cached_resources().await;
    record_tool_call("cache_refreshCachedResources", report.success);
    Json(report)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveScopeRequest {
    pub project_id: Option<String>,
    pub bucket_id: Option<String>,
}

/// Resolve document-tool identifiers against the cache.
///
/// An empty body is accepted and treated as "no ids given".
pub async fn resolve_scope_handler(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ResolvedScope>, crate::error::AppError> {
    let req: ResolveScopeRequest = if body.trim().is_empty() {
        ResolveScopeRequest::default()
    } else {
        serde_json::from_str(&body).map_err(|e| {
            record_tool_call("resolveScope", false);
            crate::error::AppError::InvalidRequest(format!("JSON deserialization error: {}", e))
        })?
    };
    debug!(
        "Resolving scope: project={:?}, bucket={:?}",
        req.project_id, req.bucket_id
    );

    let scope = state
        .resolver
        .resolve(req.project_id.as_deref(), req.bucket_id.as_deref());
    record_tool_call("resolveScope", true);
    Ok(Json(scope))
}
