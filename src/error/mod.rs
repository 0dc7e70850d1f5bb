// Error types for gxtract
// Author: kelexine (https://github.com/kelexine)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GroundX API error: {0}")]
    GroundxApi(String),

    #[error("GROUNDX_API_KEY is not set")]
    MissingApiKey,

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Rate limited by GroundX: {0}")]
    TooManyRequests(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Cache refresh failed: {0}")]
    Refresh(#[from] RefreshError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure modes of a metadata cache refresh.
///
/// Cloneable so a single in-flight result can be handed to every caller that
/// joined it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("upstream returned no projects")]
    EmptyUpstreamResult,

    #[error("a refresh is already in progress")]
    ConcurrentRefreshInProgress,

    #[error("metadata cache is disabled")]
    Disabled,

    #[error("refresh task failed: {0}")]
    Internal(String),
}

impl RefreshError {
    /// Whether this represents an actual failed attempt rather than a skipped one.
    pub fn is_failure(&self) -> bool {
        !matches!(
            self,
            RefreshError::ConcurrentRefreshInProgress | RefreshError::Disabled
        )
    }
}

impl From<AppError> for RefreshError {
    fn from(err: AppError) -> Self {
        RefreshError::UpstreamUnavailable(err.to_string())
    }
}

// Convert AppError to HTTP responses for Axum
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            AppError::MissingApiKey | AppError::Unauthorized(_) => {
                (StatusCode::UNAUTHORIZED, "authentication_error")
            }
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request_error"),
            AppError::Config(_) | AppError::ConfigParsing(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
            }
            AppError::TooManyRequests(_) => (StatusCode::TOO_MANY_REQUESTS, "rate_limit_error"),
            AppError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable_error")
            }
            AppError::GroundxApi(_) | AppError::InvalidResponse(_) | AppError::Http(_) => {
                (StatusCode::BAD_GATEWAY, "api_error")
            }
            AppError::Refresh(RefreshError::ConcurrentRefreshInProgress) => {
                (StatusCode::CONFLICT, "refresh_in_progress")
            }
            AppError::Refresh(_) => (StatusCode::SERVICE_UNAVAILABLE, "refresh_error"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "api_error"),
        };

        let body = json!({
            "type": "error",
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
