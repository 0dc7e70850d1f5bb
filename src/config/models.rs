//! Configuration data structures for gxtract.
//!
//! This module defines the schema for the application settings, including
//! server parameters, GroundX API access and the metadata cache policy.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port).
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream GroundX API settings.
    #[serde(default)]
    pub groundx: GroundxConfig,

    /// Metadata cache policy.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `8080`
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Settings for the upstream GroundX API connection.
#[derive(Clone, Serialize, Deserialize)]
pub struct GroundxConfig {
    /// API key sent as `X-API-Key`. Usually supplied via `GROUNDX_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL for the GroundX REST API.
    /// Default: `https://api.groundx.ai/api`
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout in seconds.
    /// Default: `30`
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of attempts for retryable upstream failures.
    /// Default: `3`
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Bucket used by document tools when a request names none.
    #[serde(default)]
    pub default_bucket_id: Option<String>,
}

// Custom Debug impl that never logs the API key
impl std::fmt::Debug for GroundxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroundxConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base_url", &self.api_base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("max_retries", &self.max_retries)
            .field("default_bucket_id", &self.default_bucket_id)
            .finish()
    }
}

/// Metadata cache policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Master switch. When false every lookup misses and nothing refreshes.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Age in seconds after which a snapshot is reported stale.
    /// Default: `3600`
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,

    /// Interval in seconds between background refreshes.
    /// Default: `3600`
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,

    /// Upper bound in seconds on a whole refresh cycle, retries included.
    /// Default: `120`
    #[serde(default = "default_refresh_timeout")]
    pub refresh_timeout_seconds: u64,

    /// Exit at startup if the initial population fails.
    /// Default: `false`
    #[serde(default)]
    pub fail_on_init_error: bool,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`, `compact`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl GroundxConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_seconds)
    }
}

// Default trait implementations linking to custom logic

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for GroundxConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: default_api_base_url(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            default_bucket_id: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: default_ttl(),
            refresh_interval_seconds: default_refresh_interval(),
            refresh_timeout_seconds: default_refresh_timeout(),
            fail_on_init_error: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Helper functions for serde defaults and shared constants
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_api_base_url() -> String {
    "https://api.groundx.ai/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

fn default_ttl() -> u64 {
    3600 // 1 hour
}

fn default_refresh_interval() -> u64 {
    3600
}

fn default_refresh_timeout() -> u64 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
