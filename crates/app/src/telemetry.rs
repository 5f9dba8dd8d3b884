//! Logging and metrics setup

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::settings::{LoggingConfig, MetricsConfig};
use crate::AppError;

fn parse_level(level: &str) -> Result<Level, AppError> {
    level
        .parse::<Level>()
        .map_err(|_| AppError::Logging(format!("unknown log level '{}'", level)))
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> Result<(), AppError> {
    let level = parse_level(&config.level)?;
    let builder = FmtSubscriber::builder().with_max_level(level).with_target(true);

    let result = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.map_err(|e| AppError::Logging(e.to_string()))
}

/// Install the Prometheus exporter; must be called inside a tokio runtime
pub fn init_metrics(config: &MetricsConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .map_err(|e| AppError::Metrics(format!("bad listen address '{}': {}", config.listen_addr, e)))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| AppError::Metrics(e.to_string()))?;

    info!("Prometheus exporter listening on {}", addr);
    Ok(())
}
