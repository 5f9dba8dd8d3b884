//! Risk Monitor
//!
//! Drives the risk engine on a fixed cadence: every tick it snapshots the
//! shared world (self vehicle, peer roster, hazard zones, tunables),
//! validates it, evaluates it, and hands the verdict to a sink without
//! ever blocking on it.

mod monitor;
mod world;

pub use monitor::{MonitorConfig, MonitorHandle, MonitorStats, RiskMonitor};
pub use world::{SharedWorld, World};

use thiserror::Error;

/// Monitor error types
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Verdict sink closed")]
    SinkClosed,

    #[error("Rejected tunables: {0}")]
    InvalidTunables(#[from] input_validator::ValidationError),

    #[error("Monitor task failed: {0}")]
    Task(String),
}
