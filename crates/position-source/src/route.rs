//! Scripted route simulator and fix replay

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use risk_engine::GeoPoint;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{PositionError, PositionFix, PositionSource};

/// Default simulation start (New Delhi)
pub const DEFAULT_START: GeoPoint = GeoPoint::new(28.6139, 77.2090);

/// One straight leg of a scripted route
///
/// The leg's total displacement is spread evenly across its steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    /// Total latitude change over the leg (degrees)
    pub lat_delta: f64,
    /// Total longitude change over the leg (degrees)
    pub lng_delta: f64,
    /// Number of fixes the leg spans
    pub steps: u32,
}

impl RouteLeg {
    pub const fn new(lat_delta: f64, lng_delta: f64, steps: u32) -> Self {
        Self {
            lat_delta,
            lng_delta,
            steps,
        }
    }

    /// Compass heading of travel, `None` for a stationary leg
    pub fn heading_deg(&self) -> Option<f64> {
        if self.lat_delta == 0.0 && self.lng_delta == 0.0 {
            return None;
        }
        let heading = self.lng_delta.atan2(self.lat_delta).to_degrees();
        Some((heading + 360.0) % 360.0)
    }
}

/// North, east, north-east, then back south; repeats forever
pub fn default_legs() -> Vec<RouteLeg> {
    vec![
        RouteLeg::new(0.0001, 0.0, 20),
        RouteLeg::new(0.0, 0.0001, 15),
        RouteLeg::new(0.0001, 0.0001, 25),
        RouteLeg::new(-0.0001, 0.0, 10),
    ]
}

/// Replays a looping scripted route with noisy speed and accuracy
pub struct SimulatedRoute {
    legs: Vec<RouteLeg>,
    leg: usize,
    step: u32,
    position: GeoPoint,
    heading: f64,
    rng: StdRng,
}

impl SimulatedRoute {
    /// Default route from `start`
    pub fn new(start: GeoPoint) -> Self {
        Self {
            legs: default_legs(),
            leg: 0,
            step: 0,
            position: start,
            heading: 0.0,
            rng: StdRng::from_entropy(),
        }
    }

    /// Custom route; every leg needs at least one step
    pub fn with_legs(start: GeoPoint, legs: Vec<RouteLeg>) -> Result<Self, PositionError> {
        if legs.is_empty() {
            return Err(PositionError::InvalidRoute("no legs".to_string()));
        }
        if let Some(i) = legs.iter().position(|leg| leg.steps == 0) {
            return Err(PositionError::InvalidRoute(format!("leg {} has zero steps", i)));
        }
        Ok(Self {
            legs,
            ..Self::new(start)
        })
    }

    /// Reseed the noise generator for reproducible runs
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Current position
    pub fn position(&self) -> GeoPoint {
        self.position
    }
}

impl Default for SimulatedRoute {
    fn default() -> Self {
        Self::new(DEFAULT_START)
    }
}

impl PositionSource for SimulatedRoute {
    fn next_fix(&mut self) -> Result<PositionFix, PositionError> {
        let leg = *self
            .legs
            .get(self.leg)
            .ok_or_else(|| PositionError::InvalidRoute(format!("leg {} out of range", self.leg)))?;

        self.position.lat += leg.lat_delta / leg.steps as f64;
        self.position.lng += leg.lng_delta / leg.steps as f64;
        if let Some(heading) = leg.heading_deg() {
            self.heading = heading;
        }

        let speed = 20.0 + (self.step as f64 * 0.1).sin() * 15.0 + self.rng.gen_range(0.0..10.0);
        let accuracy = 2.0 + self.rng.gen_range(0.0..3.0);

        self.step += 1;
        if self.step >= leg.steps {
            self.leg = (self.leg + 1) % self.legs.len();
            self.step = 0;
            debug!("Simulated route moving to leg {}", self.leg);
        }

        Ok(PositionFix {
            lat: self.position.lat,
            lng: self.position.lng,
            accuracy_m: accuracy,
            speed_kmh: speed.max(0.0),
            heading_deg: self.heading,
        })
    }
}

/// Replays a fixed sequence of fixes once
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    fixes: VecDeque<PositionFix>,
}

impl ReplaySource {
    pub fn new(fixes: impl IntoIterator<Item = PositionFix>) -> Self {
        Self {
            fixes: fixes.into_iter().collect(),
        }
    }

    /// Fixes left to replay
    pub fn remaining(&self) -> usize {
        self.fixes.len()
    }
}

impl PositionSource for ReplaySource {
    fn next_fix(&mut self) -> Result<PositionFix, PositionError> {
        self.fixes.pop_front().ok_or(PositionError::Exhausted)
    }
}
