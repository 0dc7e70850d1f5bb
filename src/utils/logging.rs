//! Structured logging and security-focused trace utilities.
//!
//! This module configures the `tracing` ecosystem for the application,
//! supporting multiple output formats and providing utilities to prevent
//! the GroundX API key from leaking into logs.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::config::LoggingConfig;
use crate::error::{AppError, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber for the application.
///
/// Supports three output formats:
/// - `json`: Structured JSON logs for production ingestion.
/// - `compact`: Single-line human-readable output.
/// - `pretty` (default): Multi-line, colorized output for development.
///
/// Logs go to stderr so stdout stays free for tool transports. Log levels are
/// controlled via the `RUST_LOG` environment variable or the provided
/// `LoggingConfig`.
pub fn init(config: &LoggingConfig) -> Result<()> {
    // Configure filter from environment or config file
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        "compact" => registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| AppError::Internal(format!("Failed to initialize logging: {}", e)))
}

/// Markers after which GroundX credentials appear in headers, URLs and JSON.
const KEY_MARKERS: [&str; 3] = ["x-api-key", "apikey", "api_key"];

/// Sanitizes API keys from log messages.
///
/// Any value following a known key marker (`X-API-Key: ...`, `"apiKey":"..."`,
/// `api_key=...`) is replaced with `[REDACTED]` up to the next delimiter.
pub fn sanitize(input: &str) -> String {
    let mut result = input.to_string();

    for marker in KEY_MARKERS {
        let mut search_from = 0;
        while let Some(found) = result.to_ascii_lowercase()[search_from..].find(marker) {
            let marker_end = search_from + found + marker.len();

            // Skip separators between the marker and the value
            let value_start = result[marker_end..]
                .find(|c: char| !matches!(c, ':' | '=' | ' ' | '"' | '\''))
                .map(|i| marker_end + i)
                .unwrap_or(result.len());
            let value_end = result[value_start..]
                .find(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '&' | ',' | '}'))
                .map(|i| value_start + i)
                .unwrap_or(result.len());

            search_from = if value_end > value_start {
                result.replace_range(value_start..value_end, "[REDACTED]");
                value_start + "[REDACTED]".len()
            } else {
                marker_end
            };
        }
    }

    result
}
