//! Collision Risk Engine
//!
//! Pure, per-tick classification of a scene into SAFE / WARNING / DANGER:
//! - Geo strategy: haversine distance, speed-scaled safe distance, TTC
//!   with a heading-cone approach test, fixed hazard zones
//! - Planar strategy: Euclidean distance, relative-velocity TTC,
//!   sensitivity-scaled thresholds, obstacles and a 3 s path check
//! - Worst-wins arbitration with first-found tie-break
//!
//! Nothing here keeps state between evaluations.

pub mod arbitration;
pub mod config;
pub mod geo;
pub mod hazard;
pub mod planar;
pub mod strategy;
pub mod vehicle;
pub mod verdict;

pub use arbitration::arbitrate;
pub use config::{ClosingModel, Sensitivity, Tunables};
pub use geo::GeoPoint;
pub use hazard::{HazardCategory, HazardZone};
pub use planar::{Obstacle, ObstacleKind, PlanarPoint, PlanarRiskStrategy, PlanarScene};
pub use strategy::{GeoRiskStrategy, GeoScene, RiskStrategy};
pub use vehicle::{Role, VehicleState};
pub use verdict::{Classification, RiskLevel, Threat, ThreatType, Verdict};

use serde::{Deserialize, Serialize};
use tracing::trace;

/// One scene in either coordinate system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "coordinates", rename_all = "lowercase")]
pub enum Snapshot {
    Geo(GeoScene),
    Planar(PlanarScene),
}

impl Snapshot {
    /// Number of vehicles in the scene, self included
    pub fn vehicle_count(&self) -> usize {
        match self {
            Snapshot::Geo(scene) => scene.vehicles.len(),
            Snapshot::Planar(scene) => scene.vehicles.len(),
        }
    }
}

impl From<GeoScene> for Snapshot {
    fn from(scene: GeoScene) -> Self {
        Snapshot::Geo(scene)
    }
}

impl From<PlanarScene> for Snapshot {
    fn from(scene: PlanarScene) -> Self {
        Snapshot::Planar(scene)
    }
}

/// Dispatches a snapshot to the strategy for its coordinate system
#[derive(Debug, Clone, Default)]
pub struct RiskEngine {
    geo: GeoRiskStrategy,
    planar: PlanarRiskStrategy,
}

impl RiskEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate one snapshot
    pub fn evaluate(&self, snapshot: &Snapshot, tunables: &Tunables) -> Verdict {
        let (strategy, verdict) = match snapshot {
            Snapshot::Geo(scene) => (self.geo.name(), self.geo.evaluate(scene, tunables)),
            Snapshot::Planar(scene) => (self.planar.name(), self.planar.evaluate(scene, tunables)),
        };
        trace!("{} strategy: {} vehicles -> {}", strategy, snapshot.vehicle_count(), verdict.level);
        verdict
    }
}
