// CLI module for gxtract
// Author: kelexine (https://github.com/kelexine)

use clap::Parser;

/// gxtract - GroundX metadata cache and tool server
#[derive(Parser, Debug)]
#[command(name = "gxtract", version, about, long_about = None)]
pub struct Args {
    /// Path to a TOML config file (default: ~/.gxtract/config.toml)
    #[arg(long)]
    pub config: Option<String>,

    /// Host address for the HTTP server
    #[arg(long)]
    pub host: Option<String>,

    /// Port for the HTTP server
    #[arg(long)]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "MCP_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format (pretty, json, compact)
    #[arg(long, env = "MCP_LOG_FORMAT")]
    pub log_format: Option<String>,

    /// GroundX API key
    #[arg(long, env = "GROUNDX_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Default bucket ID used when a document request names none
    #[arg(long, env = "GROUNDX_DEFAULT_BUCKET_ID")]
    pub default_bucket_id: Option<String>,

    /// Disable the GroundX metadata cache
    #[arg(
        long,
        env = "GROUNDX_DISABLE_CACHE",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub disable_cache: bool,

    /// Exit if the initial cache population fails
    #[arg(
        long,
        env = "GROUNDX_FAIL_ON_CACHE_INIT_ERROR",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub fail_on_cache_init_error: bool,
}
