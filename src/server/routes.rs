// HTTP routes configuration
// Author: kelexine (https://github.com/kelexine)

use super::handlers::{
    cache_statistics_handler, health_handler, list_cached_resources_handler, metrics_handler,
    refresh_cached_resources_handler, refresh_metadata_cache_handler, resolve_scope_handler,
};
use super::middleware::request_id_layers;
use crate::cache::RefreshCoordinator;
use crate::config::AppConfig;
use crate::tools::{CacheTools, ResourceResolver};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub tools: CacheTools,
    pub resolver: ResourceResolver,
}

pub fn create_router(config: AppConfig, coordinator: RefreshCoordinator) -> Router {
    let resolver = ResourceResolver::new(
        coordinator.repository().clone(),
        config.groundx.default_bucket_id.clone(),
    );
    let state = AppState {
        config,
        tools: CacheTools::new(coordinator),
        resolver,
    };

    let (set_request_id, propagate_request_id) = request_id_layers();

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/tools/cache_getCacheStatistics", post(cache_statistics_handler))
        .route("/tools/cache_listCachedResources", post(list_cached_resources_handler))
        .route("/tools/cache_refreshMetadataCache", post(refresh_metadata_cache_handler))
        .route(
            "/tools/cache_refreshCachedResources",
            post(refresh_cached_resources_handler),
        )
        .route("/tools/resolveScope", post(resolve_scope_handler))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id)
        .layer(set_request_id)
        .with_state(state)
}
