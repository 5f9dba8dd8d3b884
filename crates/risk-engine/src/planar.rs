//! Planar detector for local or simulated (x, y) coordinate systems
//!
//! Headings are mathematical angles (0° along +x, counter-clockwise) and
//! speeds are plane units per second. Unlike the geo strategy this one
//! resolves velocities into vectors, uses strict `<` comparisons, stops at
//! the first DANGER it finds, and adds a 3 s predictive path check.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Tunables;
use crate::strategy::RiskStrategy;
use crate::vehicle::{self, VehicleState};
use crate::verdict::{Classification, RiskLevel, Threat, ThreatType, Verdict};

/// Fixed baseline safety distance (plane units)
pub const BASE_SAFETY_DISTANCE: f64 = 50.0;

/// Safety distance added per unit of the faster vehicle's speed
pub const SPEED_SAFETY_FACTOR: f64 = 10.0;

/// TTC below which a vehicle is DANGER (seconds)
pub const DANGER_TTC_S: f64 = 2.0;

/// TTC below which a vehicle is WARNING (seconds)
pub const WARNING_TTC_S: f64 = 4.0;

/// Obstacle DANGER distance before sensitivity scaling
pub const OBSTACLE_DANGER_DISTANCE: f64 = 30.0;

/// Obstacle WARNING distance before sensitivity scaling
pub const OBSTACLE_WARNING_DISTANCE: f64 = 60.0;

/// How far ahead the predictive path check projects (seconds)
pub const PREDICTION_HORIZON_S: f64 = 3.0;

/// Projected separation below which the path check warns, before sensitivity scaling
pub const PREDICTED_SEPARATION: f64 = 40.0;

/// Point on a flat plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`
    pub fn distance_to(&self, other: &PlanarPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Obstacle kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    Static,
    Dynamic,
}

/// A point obstacle on the plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: String,
    pub position: PlanarPoint,
    pub kind: ObstacleKind,
}

impl Obstacle {
    pub fn new(id: impl Into<String>, position: PlanarPoint, kind: ObstacleKind) -> Self {
        Self {
            id: id.into(),
            position,
            kind,
        }
    }
}

/// Inputs for one planar evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanarScene {
    /// Self plus peers, in roster order
    pub vehicles: Vec<VehicleState<PlanarPoint>>,
    /// Obstacles, in list order
    pub obstacles: Vec<Obstacle>,
}

/// Velocity vector from speed and math-angle heading
pub fn velocity(vehicle: &VehicleState<PlanarPoint>) -> (f64, f64) {
    let heading = vehicle.heading.to_radians();
    (heading.cos() * vehicle.speed, heading.sin() * vehicle.speed)
}

/// Magnitude of the relative velocity between two vehicles
pub fn relative_speed(a: &VehicleState<PlanarPoint>, b: &VehicleState<PlanarPoint>) -> f64 {
    let (ax, ay) = velocity(a);
    let (bx, by) = velocity(b);
    (ax - bx).hypot(ay - by)
}

/// Time-to-collision from the relative speed, `f64::INFINITY` when both
/// vehicles move identically
pub fn time_to_collision_s(
    a: &VehicleState<PlanarPoint>,
    b: &VehicleState<PlanarPoint>,
    distance: f64,
) -> f64 {
    let speed = relative_speed(a, b);
    if speed > 0.0 {
        distance / speed
    } else {
        f64::INFINITY
    }
}

/// Position after `seconds` at constant speed and heading
pub fn project(vehicle: &VehicleState<PlanarPoint>, seconds: f64) -> PlanarPoint {
    let (vx, vy) = velocity(vehicle);
    PlanarPoint::new(
        vehicle.position.x + vx * seconds,
        vehicle.position.y + vy * seconds,
    )
}

/// Speed-scaled, sensitivity-adjusted safety distance
pub fn adjusted_safety_distance(speed_a: f64, speed_b: f64, sensitivity: f64) -> f64 {
    let dynamic = BASE_SAFETY_DISTANCE + speed_a.max(speed_b) * SPEED_SAFETY_FACTOR;
    dynamic * sensitivity
}

/// Classify a peer on the plane
pub fn classify_vehicle(
    me: &VehicleState<PlanarPoint>,
    peer: &VehicleState<PlanarPoint>,
    sensitivity: f64,
) -> Classification {
    let distance = me.position.distance_to(&peer.position);
    let ttc_s = time_to_collision_s(me, peer, distance);
    let safety = adjusted_safety_distance(me.speed, peer.speed, sensitivity);

    let level = if distance < safety * 0.5 || ttc_s < DANGER_TTC_S {
        RiskLevel::Danger
    } else if distance < safety || ttc_s < WARNING_TTC_S {
        RiskLevel::Warning
    } else {
        RiskLevel::Safe
    };

    Classification {
        level,
        threat: Threat {
            kind: ThreatType::Vehicle,
            id: peer.id.clone(),
            distance_m: distance,
        },
    }
}

/// Classify an obstacle on the plane
pub fn classify_obstacle(
    me: &VehicleState<PlanarPoint>,
    obstacle: &Obstacle,
    sensitivity: f64,
) -> Classification {
    let distance = me.position.distance_to(&obstacle.position);

    let level = if distance < OBSTACLE_DANGER_DISTANCE * sensitivity {
        RiskLevel::Danger
    } else if distance < OBSTACLE_WARNING_DISTANCE * sensitivity {
        RiskLevel::Warning
    } else {
        RiskLevel::Safe
    };

    Classification {
        level,
        threat: Threat {
            kind: ThreatType::Hazard,
            id: obstacle.id.clone(),
            distance_m: distance,
        },
    }
}

/// Predictive path check: first moving peer whose position 3 s ahead
/// comes within the sensitivity-scaled separation of mine
pub fn predict_path_conflict(
    me: &VehicleState<PlanarPoint>,
    vehicles: &[VehicleState<PlanarPoint>],
    sensitivity: f64,
) -> Option<Classification> {
    if me.speed <= 0.0 {
        return None;
    }

    let my_future = project(me, PREDICTION_HORIZON_S);
    vehicle::peers(vehicles)
        .filter(|peer| peer.speed > 0.0)
        .find(|peer| {
            let separation = my_future.distance_to(&project(peer, PREDICTION_HORIZON_S));
            separation < PREDICTED_SEPARATION * sensitivity
        })
        .map(|peer| {
            debug!("peer {}: projected path conflict within {}s", peer.id, PREDICTION_HORIZON_S);
            Classification {
                level: RiskLevel::Warning,
                threat: Threat {
                    kind: ThreatType::Vehicle,
                    id: peer.id.clone(),
                    distance_m: me.position.distance_to(&peer.position),
                },
            }
        })
}

/// Strategy for flat Euclidean coordinates
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarRiskStrategy;

impl RiskStrategy for PlanarRiskStrategy {
    type Scene = PlanarScene;

    fn name(&self) -> &'static str {
        "planar"
    }

    fn evaluate(&self, scene: &PlanarScene, tunables: &Tunables) -> Verdict {
        let Some(me) = vehicle::find_ego(&scene.vehicles) else {
            return Verdict::safe();
        };
        let sensitivity = tunables.sensitivity.multiplier();

        let vehicle_threats = vehicle::peers(&scene.vehicles).map(|peer| classify_vehicle(me, peer, sensitivity));
        let obstacle_threats = scene
            .obstacles
            .iter()
            .map(|obstacle| classify_obstacle(me, obstacle, sensitivity));

        let mut first_warning = None;
        for candidate in vehicle_threats.chain(obstacle_threats) {
            match candidate.level {
                RiskLevel::Danger => return Verdict::from_classification(candidate),
                RiskLevel::Warning if first_warning.is_none() => first_warning = Some(candidate),
                _ => {}
            }
        }

        match first_warning {
            Some(warning) => Verdict::from_classification(warning),
            None => predict_path_conflict(me, &scene.vehicles, sensitivity)
                .map(Verdict::from_classification)
                .unwrap_or_default(),
        }
    }
}
