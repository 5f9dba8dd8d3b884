//! Range checks for engine inputs

use crate::error::ValidationError;
use risk_engine::{GeoPoint, GeoScene, HazardZone, Tunables, VehicleState};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Latitude valid range (degrees)
    pub lat_range: (f64, f64),
    /// Longitude valid range (degrees)
    pub lng_range: (f64, f64),
    /// Speed valid range (km/h)
    pub speed_range: (f64, f64),
    /// Safe distance valid range (meters)
    pub safe_distance_range: (f64, f64),
    /// Proximity multiplier valid range
    pub proximity_multiplier_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            lat_range: (-90.0, 90.0),
            lng_range: (-180.0, 180.0),
            speed_range: (0.0, 300.0),
            safe_distance_range: (20.0, 100.0),
            proximity_multiplier_range: (1.0, 3.0),
        }
    }
}

/// Result of validating a whole scene
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of entities validated
    pub entities_checked: usize,
}

impl ValidationResult {
    fn from_errors(errors: Vec<ValidationError>, entities_checked: usize) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            entities_checked,
        }
    }

    /// First error, if any
    pub fn into_result(self) -> Result<(), ValidationError> {
        match self.errors.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Validator for risk engine inputs
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against an inclusive range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite { field });
        }
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate a geographic position
    pub fn validate_position(&self, position: &GeoPoint) -> Result<(), ValidationError> {
        self.validate_range("lat", position.lat, self.config.lat_range)?;
        self.validate_range("lng", position.lng, self.config.lng_range)
    }

    /// Validate speed (km/h)
    pub fn validate_speed(&self, speed: f64) -> Result<(), ValidationError> {
        self.validate_range("speed", speed, self.config.speed_range)
    }

    /// Validate heading, half-open [0, 360)
    pub fn validate_heading(&self, heading: f64) -> Result<(), ValidationError> {
        if !heading.is_finite() {
            return Err(ValidationError::NonFinite { field: "heading" });
        }
        if !(0.0..360.0).contains(&heading) {
            return Err(ValidationError::OutOfRange {
                field: "heading",
                value: heading,
                min: 0.0,
                max: 360.0,
            });
        }
        Ok(())
    }

    /// Validate one vehicle state
    pub fn validate_vehicle(&self, vehicle: &VehicleState<GeoPoint>) -> Result<(), ValidationError> {
        self.validate_position(&vehicle.position)?;
        self.validate_speed(vehicle.speed)?;
        self.validate_heading(vehicle.heading)
    }

    /// Validate one hazard zone
    pub fn validate_hazard(&self, zone: &HazardZone) -> Result<(), ValidationError> {
        self.validate_position(&zone.position)?;
        if !zone.radius_m.is_finite() {
            return Err(ValidationError::NonFinite { field: "radius_m" });
        }
        if zone.radius_m <= 0.0 {
            return Err(ValidationError::NonPositiveRadius {
                id: zone.id.clone(),
                radius_m: zone.radius_m,
            });
        }
        Ok(())
    }

    /// Validate engine tunables
    pub fn validate_tunables(&self, tunables: &Tunables) -> Result<(), ValidationError> {
        self.validate_range("safe_distance_m", tunables.safe_distance_m, self.config.safe_distance_range)?;
        self.validate_range(
            "proximity_multiplier",
            tunables.proximity_multiplier,
            self.config.proximity_multiplier_range,
        )
    }

    /// Validate every entity of a scene and collect all errors
    pub fn check_scene(&self, scene: &GeoScene) -> ValidationResult {
        let mut errors = Vec::new();

        match scene.vehicles.iter().filter(|v| v.is_ego()).count() {
            0 => errors.push(ValidationError::MissingSelf),
            1 => {}
            n => errors.push(ValidationError::DuplicateSelf(n)),
        }

        for vehicle in &scene.vehicles {
            if let Err(e) = self.validate_vehicle(vehicle) {
                warn!("Rejected vehicle {}: {}", vehicle.id, e);
                errors.push(e);
            }
        }

        for zone in &scene.hazards {
            if let Err(e) = self.validate_hazard(zone) {
                warn!("Rejected hazard zone {}: {}", zone.id, e);
                errors.push(e);
            }
        }

        ValidationResult::from_errors(errors, scene.vehicles.len() + scene.hazards.len())
    }

    /// Validate a scene, failing on the first error
    pub fn validate_scene(&self, scene: &GeoScene) -> Result<(), ValidationError> {
        self.check_scene(scene).into_result()
    }

    /// Drop the vehicles and hazard zones that fail validation and keep
    /// the rest in order. Self-vehicle cardinality is left to the engine.
    pub fn retain_valid(&self, scene: GeoScene) -> (GeoScene, Vec<ValidationError>) {
        let mut errors = Vec::new();

        let vehicles = scene
            .vehicles
            .into_iter()
            .filter(|vehicle| match self.validate_vehicle(vehicle) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Dropping vehicle {}: {}", vehicle.id, e);
                    errors.push(e);
                    false
                }
            })
            .collect();

        let hazards = scene
            .hazards
            .into_iter()
            .filter(|zone| match self.validate_hazard(zone) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Dropping hazard zone {}: {}", zone.id, e);
                    errors.push(e);
                    false
                }
            })
            .collect();

        (GeoScene::new(vehicles, hazards), errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use risk_engine::HazardCategory;

    const HOME: GeoPoint = GeoPoint::new(28.6139, 77.2090);

    fn scene(vehicles: Vec<VehicleState<GeoPoint>>, hazards: Vec<HazardZone>) -> GeoScene {
        GeoScene::new(vehicles, hazards)
    }

    #[test]
    fn test_valid_vehicle() {
        let validator = Validator::default();
        assert!(validator.validate_vehicle(&VehicleState::ego("me", HOME, 0.0, 0.0)).is_ok());
        assert!(validator.validate_vehicle(&VehicleState::peer("p", HOME, 300.0, 359.9)).is_ok());
    }

    #[test]
    fn test_invalid_coordinates() {
        let validator = Validator::default();
        assert!(matches!(
            validator.validate_position(&GeoPoint::new(91.0, 0.0)),
            Err(ValidationError::OutOfRange { field: "lat", .. })
        ));
        assert!(matches!(
            validator.validate_position(&GeoPoint::new(0.0, -180.5)),
            Err(ValidationError::OutOfRange { field: "lng", .. })
        ));
        assert_eq!(
            validator.validate_position(&GeoPoint::new(f64::NAN, 0.0)),
            Err(ValidationError::NonFinite { field: "lat" })
        );
    }

    #[test]
    fn test_speed_and_heading_ranges() {
        let validator = Validator::default();
        assert!(validator.validate_speed(-1.0).is_err());
        assert!(validator.validate_speed(301.0).is_err());
        assert!(validator.validate_heading(0.0).is_ok());
        assert!(validator.validate_heading(360.0).is_err());
        assert!(validator.validate_heading(-0.1).is_err());
        assert!(validator.validate_heading(f64::INFINITY).is_err());
    }

    #[test]
    fn test_hazard_radius_must_be_positive() {
        let validator = Validator::default();
        let ok = HazardZone::new("school-1", HOME, 30.0, HazardCategory::School);
        assert!(validator.validate_hazard(&ok).is_ok());

        let zero = HazardZone::new("bad", HOME, 0.0, HazardCategory::Hospital);
        assert_eq!(
            validator.validate_hazard(&zero),
            Err(ValidationError::NonPositiveRadius {
                id: "bad".into(),
                radius_m: 0.0
            })
        );
    }

    #[test]
    fn test_tunables_ranges() {
        let validator = Validator::default();
        assert!(validator.validate_tunables(&Tunables::default()).is_ok());

        let too_close = Tunables {
            safe_distance_m: 10.0,
            ..Default::default()
        };
        assert!(validator.validate_tunables(&too_close).is_err());

        let below_one = Tunables {
            proximity_multiplier: 0.5,
            ..Default::default()
        };
        assert!(matches!(
            validator.validate_tunables(&below_one),
            Err(ValidationError::OutOfRange {
                field: "proximity_multiplier",
                ..
            })
        ));
    }

    #[test]
    fn test_scene_requires_exactly_one_self() {
        let validator = Validator::default();

        let none = scene(vec![VehicleState::peer("p", HOME, 0.0, 0.0)], vec![]);
        assert_eq!(validator.validate_scene(&none), Err(ValidationError::MissingSelf));

        let two = scene(
            vec![
                VehicleState::ego("a", HOME, 0.0, 0.0),
                VehicleState::ego("b", HOME, 0.0, 0.0),
            ],
            vec![],
        );
        assert_eq!(validator.validate_scene(&two), Err(ValidationError::DuplicateSelf(2)));

        let one = scene(vec![VehicleState::ego("a", HOME, 0.0, 0.0)], vec![]);
        assert!(validator.validate_scene(&one).is_ok());
    }

    #[test]
    fn test_check_scene_collects_all_errors() {
        let validator = Validator::default();
        let result = validator.check_scene(&scene(
            vec![
                VehicleState::ego("me", HOME, -5.0, 0.0),
                VehicleState::peer("p", GeoPoint::new(100.0, 0.0), 10.0, 0.0),
            ],
            vec![HazardZone::new("h", HOME, -1.0, HazardCategory::Hospital)],
        ));
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.entities_checked, 3);
    }

    #[test]
    fn test_retain_valid_drops_only_bad_entities() {
        let validator = Validator::default();
        let (kept, errors) = validator.retain_valid(scene(
            vec![
                VehicleState::ego("me", HOME, 0.0, 0.0),
                VehicleState::peer("fast", HOME, 301.0, 0.0),
                VehicleState::peer("near", HOME, 30.0, 90.0),
            ],
            vec![
                HazardZone::new("bad", HOME, 0.0, HazardCategory::School),
                HazardZone::new("school-1", HOME, 30.0, HazardCategory::School),
            ],
        ));

        let ids: Vec<_> = kept.vehicles.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["me", "near"]);
        assert_eq!(kept.hazards.len(), 1);
        assert_eq!(kept.hazards[0].id, "school-1");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_retain_valid_keeps_scene_without_self() {
        let validator = Validator::default();
        let (kept, errors) = validator.retain_valid(scene(vec![], vec![]));
        assert!(kept.vehicles.is_empty());
        assert!(errors.is_empty());
    }

    proptest! {
        #[test]
        fn prop_in_range_vehicles_validate(
            lat in -90.0f64..=90.0,
            lng in -180.0f64..=180.0,
            speed in 0.0f64..=300.0,
            heading in 0.0f64..360.0,
        ) {
            let validator = Validator::default();
            let vehicle = VehicleState::peer("p", GeoPoint::new(lat, lng), speed, heading);
            prop_assert!(validator.validate_vehicle(&vehicle).is_ok());
        }
    }
}
