//! Fixed hazard zones and their proximity evaluator

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geo::{self, GeoPoint};
use crate::verdict::{Classification, RiskLevel, Threat, ThreatType};

/// Hazard zone category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardCategory {
    Intersection,
    School,
    #[default]
    Hospital,
}

impl HazardCategory {
    /// (warning, danger) multipliers applied to the zone radius
    pub fn radius_multipliers(self) -> (f64, f64) {
        match self {
            HazardCategory::Intersection => (3.0, 1.5),
            HazardCategory::School => (2.5, 1.2),
            HazardCategory::Hospital => (2.0, 1.0),
        }
    }

    /// Threat type reported for this category
    pub fn threat_type(self) -> ThreatType {
        match self {
            HazardCategory::Intersection => ThreatType::Intersection,
            _ => ThreatType::Hazard,
        }
    }
}

/// A fixed circular hazard zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardZone {
    /// Zone identity
    pub id: String,

    /// Zone center
    pub position: GeoPoint,

    /// Zone radius (meters, > 0)
    pub radius_m: f64,

    /// Zone category
    pub category: HazardCategory,
}

impl HazardZone {
    pub fn new(id: impl Into<String>, position: GeoPoint, radius_m: f64, category: HazardCategory) -> Self {
        Self {
            id: id.into(),
            position,
            radius_m,
            category,
        }
    }

    /// Distance from the center at or below which the zone is WARNING (meters)
    pub fn warning_distance_m(&self) -> f64 {
        self.radius_m * self.category.radius_multipliers().0
    }

    /// Distance from the center at or below which the zone is DANGER (meters)
    pub fn danger_distance_m(&self) -> f64 {
        self.radius_m * self.category.radius_multipliers().1
    }
}

/// Classify a hazard zone relative to the self position
pub fn classify(me: &GeoPoint, zone: &HazardZone) -> Classification {
    let distance_m = geo::distance_m(me, &zone.position);

    let level = if distance_m <= zone.danger_distance_m() {
        RiskLevel::Danger
    } else if distance_m <= zone.warning_distance_m() {
        RiskLevel::Warning
    } else {
        RiskLevel::Safe
    };

    debug!("hazard {} ({:?}): {:.1}m -> {:?}", zone.id, zone.category, distance_m, level);

    Classification {
        level,
        threat: Threat {
            kind: zone.category.threat_type(),
            id: zone.id.clone(),
            distance_m,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: GeoPoint = GeoPoint::new(28.6150, 77.2095);

    /// Self position `meters` due south of CENTER
    fn south_of_center(meters: f64) -> GeoPoint {
        let d_lat = (meters / geo::EARTH_RADIUS_M).to_degrees();
        GeoPoint::new(CENTER.lat - d_lat, CENTER.lng)
    }

    #[test]
    fn test_intersection_thresholds() {
        let zone = HazardZone::new("intersection-1", CENTER, 50.0, HazardCategory::Intersection);
        assert_eq!(zone.danger_distance_m(), 75.0);
        assert_eq!(zone.warning_distance_m(), 150.0);

        assert_eq!(classify(&south_of_center(0.0), &zone).level, RiskLevel::Danger);
        assert_eq!(classify(&south_of_center(74.9), &zone).level, RiskLevel::Danger);
        assert_eq!(classify(&south_of_center(75.1), &zone).level, RiskLevel::Warning);
        assert_eq!(classify(&south_of_center(149.9), &zone).level, RiskLevel::Warning);
        assert_eq!(classify(&south_of_center(150.1), &zone).level, RiskLevel::Safe);
    }

    #[test]
    fn test_school_thresholds() {
        let zone = HazardZone::new("school-1", CENTER, 30.0, HazardCategory::School);
        assert!((zone.danger_distance_m() - 36.0).abs() < 1e-9);
        assert!((zone.warning_distance_m() - 75.0).abs() < 1e-9);

        assert_eq!(classify(&south_of_center(35.0), &zone).level, RiskLevel::Danger);
        assert_eq!(classify(&south_of_center(40.0), &zone).level, RiskLevel::Warning);
        assert_eq!(classify(&south_of_center(80.0), &zone).level, RiskLevel::Safe);
    }

    #[test]
    fn test_hospital_thresholds() {
        let zone = HazardZone::new("hospital-1", CENTER, 40.0, HazardCategory::Hospital);
        assert_eq!(classify(&south_of_center(39.0), &zone).level, RiskLevel::Danger);
        assert_eq!(classify(&south_of_center(79.0), &zone).level, RiskLevel::Warning);
        assert_eq!(classify(&south_of_center(81.0), &zone).level, RiskLevel::Safe);
    }

    #[test]
    fn test_threat_type_mapping() {
        let intersection = HazardZone::new("i", CENTER, 50.0, HazardCategory::Intersection);
        let school = HazardZone::new("s", CENTER, 30.0, HazardCategory::School);
        let hospital = HazardZone::new("h", CENTER, 40.0, HazardCategory::Hospital);

        assert_eq!(classify(&CENTER, &intersection).threat.kind, ThreatType::Intersection);
        assert_eq!(classify(&CENTER, &school).threat.kind, ThreatType::Hazard);
        assert_eq!(classify(&CENTER, &hospital).threat.kind, ThreatType::Hazard);
    }

    #[test]
    fn test_category_deserializes_lowercase() {
        let zone: HazardZone = serde_json::from_str(
            r#"{"id":"school-1","position":{"lat":28.613,"lng":77.2085},"radius_m":30.0,"category":"school"}"#,
        )
        .unwrap();
        assert_eq!(zone.category, HazardCategory::School);
    }
}
