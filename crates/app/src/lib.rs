//! Collision Guard Runtime
//!
//! Wires the position source, peer roster, risk monitor and alerting
//! together behind layered configuration, structured logging and an
//! optional Prometheus exporter.

pub mod runtime;
pub mod settings;
pub mod telemetry;

pub use runtime::run;
pub use settings::{default_hazards, AppConfig, LoggingConfig, MetricsConfig};
pub use telemetry::{init_logging, init_metrics};

use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Metrics setup failed: {0}")]
    Metrics(String),

    #[error("Invalid input: {0}")]
    Validation(#[from] input_validator::ValidationError),

    #[error("Peer roster error: {0}")]
    Roster(#[from] peer_roster::RosterError),

    #[error("Monitor error: {0}")]
    Monitor(#[from] monitor::MonitorError),
}
