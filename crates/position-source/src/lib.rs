//! Position Source for the Self Vehicle
//!
//! Provides position fixes for the vehicle running the assistant:
//! - `PositionSource` trait for anything that yields fixes
//! - Scripted route simulator for offline use
//! - Replay of a recorded fix sequence
//! - Async service polling a source on a fixed period

pub mod route;
pub mod service;

pub use route::{ReplaySource, RouteLeg, SimulatedRoute};
pub use service::{PositionConfig, PositionService};

use risk_engine::{GeoPoint, VehicleState};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Position error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PositionError {
    #[error("Position source exhausted")]
    Exhausted,

    #[error("Position unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid route: {0}")]
    InvalidRoute(String),
}

/// A single position fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    /// Latitude (degrees)
    pub lat: f64,
    /// Longitude (degrees)
    pub lng: f64,
    /// Horizontal accuracy (meters)
    pub accuracy_m: f64,
    /// Ground speed (km/h)
    pub speed_kmh: f64,
    /// Compass heading (degrees)
    pub heading_deg: f64,
}

impl PositionFix {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    /// Self-vehicle state for this fix
    pub fn to_vehicle(&self, id: impl Into<String>) -> VehicleState<GeoPoint> {
        VehicleState::ego(id, self.position(), self.speed_kmh, self.heading_deg)
    }
}

/// Anything that yields self-vehicle position fixes
pub trait PositionSource: Send {
    /// Produce the next fix
    fn next_fix(&mut self) -> Result<PositionFix, PositionError>;
}
