//! Geospatial primitives: great-circle distance, bearing, approach test and
//! time-to-collision.

use serde::{Deserialize, Serialize};

use crate::vehicle::VehicleState;

/// Mean Earth radius (meters)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Half-width of the heading cone used by the approach test (degrees)
pub const APPROACH_CONE_DEG: f64 = 45.0;

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude (degrees)
    pub lat: f64,
    /// Longitude (degrees)
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance to `other` in meters
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance_m(self, other)
    }

    /// Initial compass bearing towards `other` in degrees [0, 360)
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        bearing_deg(self, other)
    }
}

/// Convert km/h to m/s
#[inline]
pub fn kmh_to_mps(speed_kmh: f64) -> f64 {
    speed_kmh / 3.6
}

/// Haversine distance between two points (meters)
pub fn distance_m(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let d_lat = (p2.lat - p1.lat).to_radians();
    let d_lng = (p2.lng - p1.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + p1.lat.to_radians().cos() * p2.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial bearing from `p1` to `p2` (degrees, [0, 360))
pub fn bearing_deg(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let d_lng = (p2.lng - p1.lng).to_radians();
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();

    let bearing = (y.atan2(x).to_degrees() + 360.0) % 360.0;
    // -0.0 + 360.0 can round to exactly 360.0
    if bearing >= 360.0 {
        0.0
    } else {
        bearing
    }
}

/// Heading-alignment heuristic: is `other` pointed back at `me`?
///
/// True when the other vehicle's heading lies within a 45° cone either side
/// of the bearing from `other` to `me`. This is not an intercept test; two
/// vehicles can "approach" on parallel tracks.
pub fn is_approaching(me: &VehicleState<GeoPoint>, other: &VehicleState<GeoPoint>) -> bool {
    let bearing = bearing_deg(&other.position, &me.position);
    let difference = (other.heading - bearing).abs();
    difference < APPROACH_CONE_DEG || difference > 360.0 - APPROACH_CONE_DEG
}

/// Time-to-collision using the summed scalar speeds as the closing rate.
///
/// Treats both vehicles as driving straight at each other. Returns
/// `f64::INFINITY` when neither is moving.
pub fn time_to_collision_s(
    me: &VehicleState<GeoPoint>,
    other: &VehicleState<GeoPoint>,
    distance_m: f64,
) -> f64 {
    let closing_mps = kmh_to_mps(me.speed) + kmh_to_mps(other.speed);
    if closing_mps <= 0.0 {
        return f64::INFINITY;
    }
    distance_m / closing_mps
}

/// Rate at which the gap between `me` and `other` is shrinking (m/s).
///
/// Projects the relative velocity onto the line of sight from `me` to
/// `other`. Positive means closing, negative means opening.
pub fn closing_speed_mps(me: &VehicleState<GeoPoint>, other: &VehicleState<GeoPoint>) -> f64 {
    let (me_east, me_north) = velocity_en(me);
    let (other_east, other_north) = velocity_en(other);

    let line_of_sight = bearing_deg(&me.position, &other.position).to_radians();
    let range_rate = (other_east - me_east) * line_of_sight.sin()
        + (other_north - me_north) * line_of_sight.cos();

    -range_rate
}

/// Time-to-collision along the line of sight, `f64::INFINITY` when the gap
/// is steady or opening.
pub fn time_to_collision_line_of_sight_s(
    me: &VehicleState<GeoPoint>,
    other: &VehicleState<GeoPoint>,
    distance_m: f64,
) -> f64 {
    let closing_mps = closing_speed_mps(me, other);
    if closing_mps <= 0.0 {
        return f64::INFINITY;
    }
    distance_m / closing_mps
}

/// East/north velocity components (m/s) from compass heading
fn velocity_en(vehicle: &VehicleState<GeoPoint>) -> (f64, f64) {
    let speed = kmh_to_mps(vehicle.speed);
    let heading = vehicle.heading.to_radians();
    (speed * heading.sin(), speed * heading.cos())
}
