//! Vehicle state and the geo vehicle-threat evaluator

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ClosingModel, Tunables};
use crate::geo::{self, GeoPoint};
use crate::verdict::{Classification, RiskLevel, Threat, ThreatType};

/// Speed at which the safe distance has doubled (km/h)
pub const SPEED_NORMALIZATION_KMH: f64 = 50.0;

/// TTC at or below which an approaching peer is DANGER (seconds)
pub const DANGER_TTC_S: f64 = 3.0;

/// TTC at or below which an approaching peer is WARNING (seconds)
pub const WARNING_TTC_S: f64 = 6.0;

/// Which side of the evaluation a vehicle is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The vehicle running the assistant
    #[serde(rename = "self")]
    Ego,
    /// Any other vehicle on the roster
    Peer,
}

/// Snapshot of a single vehicle
///
/// `P` is the coordinate type: [`GeoPoint`] for the canonical engine,
/// [`PlanarPoint`](crate::planar::PlanarPoint) for the planar variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleState<P> {
    /// Vehicle identity
    pub id: String,

    /// Current position
    pub position: P,

    /// Scalar speed: km/h for geo, plane units per second for planar
    pub speed: f64,

    /// Heading in degrees: compass bearing for geo, math angle for planar
    pub heading: f64,

    /// Self or peer
    pub role: Role,
}

impl<P> VehicleState<P> {
    pub fn new(id: impl Into<String>, position: P, speed: f64, heading: f64, role: Role) -> Self {
        Self {
            id: id.into(),
            position,
            speed,
            heading,
            role,
        }
    }

    /// Create the self vehicle
    pub fn ego(id: impl Into<String>, position: P, speed: f64, heading: f64) -> Self {
        Self::new(id, position, speed, heading, Role::Ego)
    }

    /// Create a peer vehicle
    pub fn peer(id: impl Into<String>, position: P, speed: f64, heading: f64) -> Self {
        Self::new(id, position, speed, heading, Role::Peer)
    }

    pub fn is_ego(&self) -> bool {
        self.role == Role::Ego
    }
}

/// First self vehicle in `vehicles`, if any
pub fn find_ego<P>(vehicles: &[VehicleState<P>]) -> Option<&VehicleState<P>> {
    vehicles.iter().find(|v| v.is_ego())
}

/// Peers in roster order
pub fn peers<P>(vehicles: &[VehicleState<P>]) -> impl Iterator<Item = &VehicleState<P>> {
    vehicles.iter().filter(|v| v.role == Role::Peer)
}

/// Safe distance scaled by the faster of the two vehicles (meters)
pub fn dynamic_safe_distance_m(safe_distance_m: f64, speed_a_kmh: f64, speed_b_kmh: f64) -> f64 {
    let speed_factor = speed_a_kmh.max(speed_b_kmh) / SPEED_NORMALIZATION_KMH;
    safe_distance_m * (1.0 + speed_factor)
}

/// Classify one peer relative to the self vehicle
pub fn classify(
    me: &VehicleState<GeoPoint>,
    peer: &VehicleState<GeoPoint>,
    tunables: &Tunables,
) -> Classification {
    let distance_m = geo::distance_m(&me.position, &peer.position);
    let ttc_s = match tunables.closing_model {
        ClosingModel::ScalarSum => geo::time_to_collision_s(me, peer, distance_m),
        ClosingModel::LineOfSight => geo::time_to_collision_line_of_sight_s(me, peer, distance_m),
    };

    let dynamic_safe_m = dynamic_safe_distance_m(tunables.safe_distance_m, me.speed, peer.speed);
    let proximity_m = dynamic_safe_m * tunables.proximity_multiplier;
    let approaching = geo::is_approaching(me, peer);

    let level = if distance_m <= dynamic_safe_m || (approaching && ttc_s <= DANGER_TTC_S) {
        RiskLevel::Danger
    } else if distance_m <= proximity_m || (approaching && ttc_s <= WARNING_TTC_S) {
        RiskLevel::Warning
    } else {
        RiskLevel::Safe
    };

    debug!(
        "peer {}: {:.1}m (safe {:.1}m, proximity {:.1}m), ttc {:.1}s, approaching={} -> {:?}",
        peer.id, distance_m, dynamic_safe_m, proximity_m, ttc_s, approaching, level
    );

    Classification {
        level,
        threat: Threat {
            kind: ThreatType::Vehicle,
            id: peer.id.clone(),
            distance_m,
        },
    }
}
