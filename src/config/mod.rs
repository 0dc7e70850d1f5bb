// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::cli::Args;
use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. CLI arguments (highest, see [`AppConfig::apply_args`])
    /// 2. Environment variables (`GXTRACT__SECTION__KEY`)
    /// 3. Config file
    /// 4. Defaults (lowest)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(&Self::default_config_path()))
    }

    /// Same as [`AppConfig::load`] but reading the given config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            // Load from config file if it exists
            .add_source(File::from(path).required(false))
            // Override with environment variables (prefix: GXTRACT__)
            .add_source(
                Environment::with_prefix("GXTRACT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    /// Overlay command-line flags (and the GroundX environment variables clap
    /// reads for them) on top of the loaded configuration.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(host) = &args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
        }
        if let Some(format) = &args.log_format {
            self.logging.format = format.clone();
        }
        if let Some(key) = &args.api_key {
            self.groundx.api_key = Some(key.clone());
        }
        if let Some(bucket) = &args.default_bucket_id {
            self.groundx.default_bucket_id = Some(bucket.clone());
        }
        if args.disable_cache {
            self.cache.enabled = false;
        }
        if args.fail_on_cache_init_error {
            self.cache.fail_on_init_error = true;
        }
    }

    pub fn default_config_path() -> String {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gxtract")
            .join("config.toml")
            .to_string_lossy()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cache.ttl_seconds, 3600);
        assert_eq!(config.cache.refresh_interval_seconds, 3600);
        assert!(config.cache.enabled);
        assert!(!config.cache.fail_on_init_error);
        assert!(config.groundx.api_key.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[cache]\nttl_seconds = 120\nenabled = false\n\n[server]\nport = 9090"
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.cache.ttl_seconds, 120);
        assert!(!config.cache.enabled);
        assert_eq!(config.server.port, 9090);
        // Untouched sections keep their defaults
        assert_eq!(config.cache.refresh_interval_seconds, 3600);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/gxtract.toml")).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_apply_args_overrides() {
        let args = Args::parse_from([
            "gxtract",
            "--port",
            "9000",
            "--disable-cache",
            "--default-bucket-id",
            "b-42",
            "--log-format",
            "json",
        ]);
        let mut config = AppConfig::default();
        config.apply_args(&args);

        assert_eq!(config.server.port, 9000);
        assert!(!config.cache.enabled);
        assert_eq!(config.groundx.default_bucket_id.as_deref(), Some("b-42"));
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_cache_flags_accept_boolish_env_values() {
        for value in ["1", "yes", "true", "on"] {
            std::env::set_var("GROUNDX_DISABLE_CACHE", value);
            std::env::set_var("GROUNDX_FAIL_ON_CACHE_INIT_ERROR", value);
            let args = Args::try_parse_from(["gxtract"]).unwrap();
            assert!(args.disable_cache, "GROUNDX_DISABLE_CACHE={}", value);
            assert!(args.fail_on_cache_init_error);

            let mut config = AppConfig::default();
            config.apply_args(&args);
            assert!(!config.cache.enabled);
            assert!(config.cache.fail_on_init_error);
        }

        std::env::set_var("GROUNDX_DISABLE_CACHE", "0");
        std::env::set_var("GROUNDX_FAIL_ON_CACHE_INIT_ERROR", "no");
        let args = Args::try_parse_from(["gxtract"]).unwrap();
        assert!(!args.disable_cache);
        assert!(!args.fail_on_cache_init_error);

        std::env::remove_var("GROUNDX_DISABLE_CACHE");
        std::env::remove_var("GROUNDX_FAIL_ON_CACHE_INIT_ERROR");
    }

    #[test]
    fn test_debug_masks_api_key() {
        let groundx = GroundxConfig {
            api_key: Some("gx-secret-key".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", groundx);
        assert!(!debug.contains("gx-secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }
}
