//! Collision Guard - Main Entry Point

use std::path::PathBuf;

use anyhow::Context;
use app::{init_logging, init_metrics, run, AppConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional explicit config file; otherwise ./collision-guard.toml if present
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref()).context("failed to load configuration")?;

    init_logging(&config.logging)?;

    info!("=== Collision Guard v{} ===", env!("CARGO_PKG_VERSION"));

    if config.metrics.enabled {
        init_metrics(&config.metrics)?;
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let stats = run(config, shutdown).await?;
    info!(
        "{} evaluations, {} verdicts delivered, {} dropped",
        stats.ticks, stats.delivered, stats.dropped
    );

    Ok(())
}
