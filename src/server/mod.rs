//! Axum-based HTTP server for gxtract.
//!
//! Exposes the cache-management tools, scope resolution for document tools,
//! a health check and Prometheus metrics.
//!
//! # Components
//!
//! - `handlers`: one handler per endpoint.
//! - `middleware`: request ID tracking layers.
//! - `routes`: router construction and shared state.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod handlers;
mod middleware;
mod routes;

pub use handlers::{HealthResponse, HealthStatus};
pub use routes::{create_router, AppState};
