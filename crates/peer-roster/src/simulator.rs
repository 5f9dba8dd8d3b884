//! Offline peer simulator

use std::collections::HashSet;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use risk_engine::{GeoPoint, VehicleState};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{PeerRoster, RosterError};

/// Degrees moved per (km/h per second) of speed, a flat-earth approximation
const DEGREES_PER_KMH_SECOND: f64 = 0.001 / 3600.0;

/// Rectangle peers are kept inside (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat) && (self.min_lng..=self.max_lng).contains(&point.lng)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min_lat: 28.610,
            max_lat: 28.620,
            min_lng: 77.205,
            max_lng: 77.215,
        }
    }
}

/// Simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Area peers bounce inside
    pub bounds: Bounds,
    /// Peak-to-peak random speed change per step (km/h)
    pub speed_jitter_kmh: f64,
    /// Floor for jittered speed (km/h)
    pub min_speed_kmh: f64,
    /// Ceiling for jittered speed (km/h)
    pub max_speed_kmh: f64,
    /// Half-width of the spawn square around the self vehicle (degrees)
    pub spawn_spread_deg: f64,
    /// Spawned peer speed range (km/h)
    pub spawn_speed_kmh: (f64, f64),
    /// Peers spawned at startup
    pub initial_peers: usize,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            speed_jitter_kmh: 5.0,
            min_speed_kmh: 10.0,
            max_speed_kmh: 120.0,
            spawn_spread_deg: 0.001,
            spawn_speed_kmh: (20.0, 60.0),
            initial_peers: 3,
            seed: None,
        }
    }
}

/// Moves the peers it owns once per simulated second.
///
/// Only peers created with [`spawn_near`](Self::spawn_near) or
/// [`adopt`](Self::adopt) are moved and marked as seen; anything else in
/// the roster is left alone and ages out through pruning.
pub struct PeerSimulator {
    config: SimulationConfig,
    rng: StdRng,
    owned: HashSet<String>,
}

impl PeerSimulator {
    pub fn new(config: SimulationConfig) -> Result<Self, RosterError> {
        let (lo, hi) = config.spawn_speed_kmh;
        if lo >= hi {
            return Err(RosterError::InvalidConfig(format!("empty spawn speed range {}..{}", lo, hi)));
        }
        if config.min_speed_kmh >= config.max_speed_kmh {
            return Err(RosterError::InvalidConfig(format!(
                "empty speed range {}..{}",
                config.min_speed_kmh, config.max_speed_kmh
            )));
        }
        if config.spawn_spread_deg <= 0.0 {
            return Err(RosterError::InvalidConfig("spawn spread must be positive".to_string()));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            rng,
            owned: HashSet::new(),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Number of peers currently simulated
    pub fn owned_count(&self) -> usize {
        self.owned.len()
    }

    /// Put `vehicle` in the roster and simulate it from now on
    pub fn adopt(&mut self, roster: &mut PeerRoster, vehicle: VehicleState<GeoPoint>) -> Result<bool, RosterError> {
        let id = vehicle.id.clone();
        let inserted = roster.upsert(vehicle)?;
        self.owned.insert(id);
        Ok(inserted)
    }

    /// Advance every simulated peer by one second
    pub fn step(&mut self, roster: &mut PeerRoster) {
        self.step_at(roster, Instant::now());
    }

    /// [`step`](Self::step) with an explicit clock reading
    pub fn step_at(&mut self, roster: &mut PeerRoster, now: Instant) {
        let bounds = self.config.bounds;
        let jitter = self.config.speed_jitter_kmh;
        let (min_speed, max_speed) = (self.config.min_speed_kmh, self.config.max_speed_kmh);

        // Forget peers removed or pruned since the last step
        self.owned.retain(|id| roster.get(id).is_some());

        for entry in roster.entries_mut().filter(|e| self.owned.contains(&e.vehicle.id)) {
            let vehicle = &mut entry.vehicle;
            let heading = vehicle.heading.to_radians();
            let distance_deg = vehicle.speed * DEGREES_PER_KMH_SECOND;
            let next = GeoPoint::new(
                vehicle.position.lat + heading.cos() * distance_deg,
                vehicle.position.lng + heading.sin() * distance_deg,
            );

            if bounds.contains(&next) {
                vehicle.position = next;
            } else {
                vehicle.heading = (vehicle.heading + 180.0) % 360.0;
                debug!("Peer {} turned around at the boundary", vehicle.id);
            }

            let delta = (self.rng.gen::<f64>() - 0.5) * jitter;
            vehicle.speed = (vehicle.speed + delta).clamp(min_speed, max_speed);
            entry.last_seen = now;
        }
    }

    /// Add a test peer near `me`, returning its id
    pub fn spawn_near(&mut self, roster: &mut PeerRoster, me: &GeoPoint) -> Result<String, RosterError> {
        let spread = self.config.spawn_spread_deg;
        let (lo, hi) = self.config.spawn_speed_kmh;

        let id = format!("peer-{}", Uuid::new_v4());
        let position = GeoPoint::new(
            me.lat + self.rng.gen_range(-spread..spread),
            me.lng + self.rng.gen_range(-spread..spread),
        );
        let speed = self.rng.gen_range(lo..hi);
        let heading = self.rng.gen_range(0.0..360.0);

        info!("Spawned peer {} at ({:.5}, {:.5}), {:.0} km/h", id, position.lat, position.lng, speed);
        self.adopt(roster, VehicleState::peer(id.clone(), position, speed, heading))?;
        Ok(id)
    }

    /// Remove all simulated peers
    pub fn reset(&mut self, roster: &mut PeerRoster) {
        info!("Resetting simulation ({} peers)", roster.len());
        roster.clear();
        self.owned.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn seeded() -> PeerSimulator {
        PeerSimulator::new(SimulationConfig {
            seed: Some(11),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_step_moves_along_heading() {
        let mut sim = seeded();
        let mut roster = PeerRoster::new();
        let start = GeoPoint::new(28.615, 77.210);
        sim.adopt(&mut roster, VehicleState::peer("north", start, 36.0, 0.0)).unwrap();
        sim.adopt(&mut roster, VehicleState::peer("east", start, 36.0, 90.0)).unwrap();

        sim.step(&mut roster);

        let north = roster.get("north").unwrap();
        assert!((north.position.lat - (start.lat + 0.00001)).abs() < 1e-12);
        assert!((north.position.lng - start.lng).abs() < 1e-12);

        let east = roster.get("east").unwrap();
        assert!((east.position.lat - start.lat).abs() < 1e-12);
        assert!((east.position.lng - (start.lng + 0.00001)).abs() < 1e-12);
    }

    #[test]
    fn test_boundary_reverses_heading_and_holds_position() {
        let mut sim = seeded();
        let mut roster = PeerRoster::new();
        let edge = GeoPoint::new(28.62, 77.210);
        sim.adopt(&mut roster, VehicleState::peer("p", edge, 50.0, 10.0)).unwrap();

        sim.step(&mut roster);

        let p = roster.get("p").unwrap();
        assert_eq!(p.position, edge);
        assert_eq!(p.heading, 190.0);
    }

    #[test]
    fn test_speed_jitter_floor() {
        let mut sim = seeded();
        let mut roster = PeerRoster::new();
        sim.adopt(&mut roster, VehicleState::peer("slow", GeoPoint::new(28.615, 77.210), 10.0, 0.0))
            .unwrap();

        for _ in 0..200 {
            let before = roster.get("slow").unwrap().speed;
            sim.step(&mut roster);
            let after = roster.get("slow").unwrap().speed;
            assert!(after >= 10.0);
            assert!(after - before <= 2.5 + 1e-9);
        }
    }

    #[test]
    fn test_spawn_near_and_reset() {
        let mut sim = seeded();
        let mut roster = PeerRoster::new();
        let me = GeoPoint::new(28.6139, 77.2090);

        let first = sim.spawn_near(&mut roster, &me).unwrap();
        let second = sim.spawn_near(&mut roster, &me).unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("peer-"));

        for peer in roster.snapshot() {
            assert!((peer.position.lat - me.lat).abs() <= 0.001);
            assert!((peer.position.lng - me.lng).abs() <= 0.001);
            assert!((20.0..60.0).contains(&peer.speed));
            assert!((0.0..360.0).contains(&peer.heading));
        }

        sim.reset(&mut roster);
        assert!(roster.is_empty());
    }

    #[test]
    fn test_invalid_config() {
        let config = SimulationConfig {
            spawn_speed_kmh: (60.0, 20.0),
            ..Default::default()
        };
        assert!(matches!(PeerSimulator::new(config), Err(RosterError::InvalidConfig(_))));
    }

    #[test]
    fn test_only_simulated_peers_stay_fresh() {
        let mut sim = seeded();
        let mut roster = PeerRoster::new();
        let t0 = Instant::now();
        let start = GeoPoint::new(28.615, 77.210);
        roster.upsert_at(VehicleState::peer("reported", start, 30.0, 0.0), t0).unwrap();
        sim.adopt(&mut roster, VehicleState::peer("simulated", start, 30.0, 90.0)).unwrap();

        let t1 = t0 + std::time::Duration::from_secs(10);
        sim.step_at(&mut roster, t1);

        // Peers outside the simulation are neither moved nor refreshed
        assert_eq!(roster.get("reported").unwrap().position, start);
        assert_eq!(roster.prune_stale_at(std::time::Duration::from_secs(5), t1), 1);
        assert!(roster.get("reported").is_none());
        assert!(roster.get("simulated").is_some());
    }

    #[test]
    fn test_removed_peers_are_forgotten() {
        let mut sim = seeded();
        let mut roster = PeerRoster::new();
        let me = GeoPoint::new(28.6139, 77.2090);
        let id = sim.spawn_near(&mut roster, &me).unwrap();
        sim.spawn_near(&mut roster, &me).unwrap();
        assert_eq!(sim.owned_count(), 2);

        roster.remove(&id);
        sim.step(&mut roster);
        assert_eq!(sim.owned_count(), 1);
    }

    #[test]
    fn test_speed_stays_below_ceiling() {
        let mut sim = PeerSimulator::new(SimulationConfig {
            seed: Some(3),
            max_speed_kmh: 40.0,
            ..Default::default()
        })
        .unwrap();
        let mut roster = PeerRoster::new();
        sim.adopt(&mut roster, VehicleState::peer("fast", GeoPoint::new(28.615, 77.210), 39.0, 0.0))
            .unwrap();

        for _ in 0..200 {
            sim.step(&mut roster);
            assert!(roster.get("fast").unwrap().speed <= 40.0);
        }
    }

    proptest! {
        #[test]
        fn prop_peers_stay_in_bounds(
            lat in 28.610f64..=28.620,
            lng in 77.205f64..=77.215,
            speed in 10.0f64..120.0,
            heading in 0.0f64..360.0,
        ) {
            let mut sim = seeded();
            let mut roster = PeerRoster::new();
            sim.adopt(&mut roster, VehicleState::peer("p", GeoPoint::new(lat, lng), speed, heading)).unwrap();
            for _ in 0..50 {
                sim.step(&mut roster);
                let p = roster.get("p").unwrap();
                prop_assert!(Bounds::default().contains(&p.position));
            }
        }
    }
}
