//! Risk strategies and the geo (lat/lng) canonical strategy

use serde::{Deserialize, Serialize};

use crate::arbitration::arbitrate;
use crate::config::Tunables;
use crate::geo::GeoPoint;
use crate::hazard::{self, HazardZone};
use crate::vehicle::{self, VehicleState};
use crate::verdict::Verdict;

/// A pure scene-to-verdict evaluator for one coordinate system
///
/// Implementations hold no mutable state; the same scene and tunables
/// always yield the same verdict.
pub trait RiskStrategy: Send + Sync {
    /// Input snapshot this strategy understands
    type Scene;

    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Evaluate one snapshot
    fn evaluate(&self, scene: &Self::Scene, tunables: &Tunables) -> Verdict;
}

/// Inputs for one geo evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoScene {
    /// Self plus peers, in roster order
    pub vehicles: Vec<VehicleState<GeoPoint>>,
    /// Hazard zones, in list order
    pub hazards: Vec<HazardZone>,
}

impl GeoScene {
    pub fn new(vehicles: Vec<VehicleState<GeoPoint>>, hazards: Vec<HazardZone>) -> Self {
        Self { vehicles, hazards }
    }
}

/// Canonical strategy: haversine distances, worst-wins arbitration with
/// first-found tie-break over peers then hazards
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoRiskStrategy;

impl RiskStrategy for GeoRiskStrategy {
    type Scene = GeoScene;

    fn name(&self) -> &'static str {
        "geo"
    }

    fn evaluate(&self, scene: &GeoScene, tunables: &Tunables) -> Verdict {
        let Some(me) = vehicle::find_ego(&scene.vehicles) else {
            return Verdict::safe();
        };

        let vehicle_threats = vehicle::peers(&scene.vehicles).map(|peer| vehicle::classify(me, peer, tunables));
        let hazard_threats = scene
            .hazards
            .iter()
            .map(|zone| hazard::classify(&me.position, zone));

        arbitrate(vehicle_threats.chain(hazard_threats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::EARTH_RADIUS_M;
    use crate::hazard::HazardCategory;
    use crate::verdict::{RiskLevel, ThreatType};

    const ME: GeoPoint = GeoPoint::new(28.6139, 77.2090);

    fn east_of_me(meters: f64) -> GeoPoint {
        let d_lng = (meters / (EARTH_RADIUS_M * ME.lat.to_radians().cos())).to_degrees();
        GeoPoint::new(ME.lat, ME.lng + d_lng)
    }

    fn ego() -> VehicleState<GeoPoint> {
        VehicleState::ego("user", ME, 0.0, 0.0)
    }

    fn evaluate(scene: &GeoScene) -> Verdict {
        GeoRiskStrategy.evaluate(scene, &Tunables::default())
    }

    #[test]
    fn test_no_self_is_safe() {
        let scene = GeoScene::new(
            vec![VehicleState::peer("p", ME, 0.0, 0.0)],
            vec![HazardZone::new("i", ME, 50.0, HazardCategory::Intersection)],
        );
        assert_eq!(evaluate(&scene), Verdict::safe());
    }

    #[test]
    fn test_alone_is_safe() {
        let verdict = evaluate(&GeoScene::new(vec![ego()], vec![]));
        assert!(verdict.is_safe());
        assert_eq!(verdict.distance_m(), None);
        assert_eq!(verdict.threat_type(), None);
        assert_eq!(verdict.threat_id(), None);
    }

    #[test]
    fn test_peer_at_55m_is_warning() {
        let scene = GeoScene::new(
            vec![ego(), VehicleState::peer("peer-1", GeoPoint::new(28.6139, 77.20957), 0.0, 0.0)],
            vec![],
        );
        let verdict = evaluate(&scene);
        assert_eq!(verdict.level, RiskLevel::Warning);
        assert_eq!(verdict.threat_type(), Some(ThreatType::Vehicle));
        assert_eq!(verdict.threat_id(), Some("peer-1"));
        let distance = verdict.distance_m().unwrap();
        assert!((distance - 55.6).abs() < 0.2, "got {distance}");
    }

    #[test]
    fn test_half_milli_degree_east_is_inside_danger_band() {
        // 0.0005° of longitude at this latitude is ~48.8 m, not 55 m
        let scene = GeoScene::new(
            vec![ego(), VehicleState::peer("peer-1", GeoPoint::new(28.6139, 77.2095), 0.0, 0.0)],
            vec![],
        );
        let verdict = evaluate(&scene);
        assert_eq!(verdict.level, RiskLevel::Danger);
        assert!((verdict.distance_m().unwrap() - 48.8).abs() < 0.2);
    }

    #[test]
    fn test_identical_coordinates_are_danger() {
        for (speed, heading) in [(0.0, 0.0), (80.0, 45.0), (10.0, 300.0)] {
            let scene = GeoScene::new(
                vec![
                    VehicleState::ego("user", ME, speed, heading),
                    VehicleState::peer("p", ME, speed, (heading + 90.0) % 360.0),
                ],
                vec![],
            );
            let verdict = evaluate(&scene);
            assert_eq!(verdict.level, RiskLevel::Danger);
            assert_eq!(verdict.distance_m(), Some(0.0));
        }
    }

    #[test]
    fn test_intersection_radius_50() {
        let at = |meters: f64| {
            let zone = HazardZone::new("intersection-1", east_of_me(meters), 50.0, HazardCategory::Intersection);
            evaluate(&GeoScene::new(vec![ego()], vec![zone]))
        };

        let danger = at(75.0 - 0.5);
        assert_eq!(danger.level, RiskLevel::Danger);
        assert_eq!(danger.threat_type(), Some(ThreatType::Intersection));
        assert_eq!(at(149.5).level, RiskLevel::Warning);
        assert!(at(150.5).is_safe());
    }

    #[test]
    fn test_any_danger_dominates() {
        let mut vehicles = vec![ego()];
        vehicles.extend((0..5).map(|i| VehicleState::peer(format!("far-{i}"), east_of_me(1000.0 + i as f64), 0.0, 0.0)));
        vehicles.push(VehicleState::peer("close", east_of_me(10.0), 0.0, 0.0));

        let hazards = vec![
            HazardZone::new("school-1", east_of_me(2000.0), 30.0, HazardCategory::School),
            HazardZone::new("hospital-1", east_of_me(60.0), 40.0, HazardCategory::Hospital),
        ];

        let verdict = evaluate(&GeoScene::new(vehicles, hazards));
        assert_eq!(verdict.level, RiskLevel::Danger);
        assert_eq!(verdict.threat_id(), Some("close"));
    }

    #[test]
    fn test_vehicle_danger_beats_later_hazard_danger() {
        let scene = GeoScene::new(
            vec![ego(), VehicleState::peer("peer-1", east_of_me(20.0), 0.0, 0.0)],
            vec![HazardZone::new("intersection-1", ME, 50.0, HazardCategory::Intersection)],
        );
        let verdict = evaluate(&scene);
        assert_eq!(verdict.level, RiskLevel::Danger);
        assert_eq!(verdict.threat_id(), Some("peer-1"));
    }

    #[test]
    fn test_hazard_danger_overrides_vehicle_warning() {
        let scene = GeoScene::new(
            vec![ego(), VehicleState::peer("peer-1", east_of_me(80.0), 0.0, 0.0)],
            vec![HazardZone::new("school-1", east_of_me(5.0), 30.0, HazardCategory::School)],
        );
        let verdict = evaluate(&scene);
        assert_eq!(verdict.level, RiskLevel::Danger);
        assert_eq!(verdict.threat_type(), Some(ThreatType::Hazard));
        assert_eq!(verdict.threat_id(), Some("school-1"));
    }

    #[test]
    fn test_stationary_vehicles_only_trigger_on_distance() {
        // Both stopped, pointed at each other: ttc is infinite
        let scene = GeoScene::new(
            vec![
                VehicleState::ego("user", ME, 0.0, 90.0),
                VehicleState::peer("p", east_of_me(150.0), 0.0, 270.0),
            ],
            vec![],
        );
        assert!(evaluate(&scene).is_safe());
    }
}
