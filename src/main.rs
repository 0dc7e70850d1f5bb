// gxtract - GroundX metadata cache and tool server
// Author: kelexine (https://github.com/kelexine)

use anyhow::Result;
use clap::Parser;
use gxtract::cache::{RefreshCoordinator, RefreshScheduler, ResourceRepository};
use gxtract::cli::Args;
use gxtract::config::AppConfig;
use gxtract::error::AppError;
use gxtract::groundx::GroundxClient;
use gxtract::server::create_router;
use gxtract::utils::logging;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(Path::new(path))?,
        None => AppConfig::load()?,
    };
    config.apply_args(&args);

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting gxtract v{}", env!("CARGO_PKG_VERSION"));
    if config.groundx.api_key.as_deref().unwrap_or("").is_empty() {
        warn!("GROUNDX_API_KEY is not set; GroundX calls will fail until it is configured");
    }

    // Phase 3: Build the metadata cache
    let client = GroundxClient::new(&config.groundx)?;
    let repository = Arc::new(ResourceRepository::new(
        config.cache.enabled,
        config.cache.ttl(),
    ));
    let coordinator = RefreshCoordinator::new(
        repository,
        Arc::new(client),
        config.cache.refresh_timeout(),
    );

    // Phase 4: Initial population and background refresh
    let scheduler = if config.cache.enabled {
        info!("Populating GroundX metadata cache...");
        match coordinator.refresh().await {
            Ok(outcome) => info!(
                "Metadata cache ready: {} projects, {} buckets",
                outcome.project_count, outcome.bucket_count
            ),
            Err(e) if config.cache.fail_on_init_error => {
                error!("Initial metadata cache population failed: {}", e);
                return Err(AppError::Refresh(e).into());
            }
            Err(e) => warn!(
                "Initial metadata cache population failed, continuing with an empty cache: {}",
                e
            ),
        }
        Some(RefreshScheduler::new(coordinator.clone(), config.cache.refresh_interval()).spawn())
    } else {
        info!("Metadata cache disabled");
        None
    };

    // Phase 5: Build and start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let app = create_router(config, coordinator);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 6: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(scheduler) = scheduler {
        scheduler.shutdown().await;
    }

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
