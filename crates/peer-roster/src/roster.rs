//! Insertion-ordered peer roster

use std::time::{Duration, Instant};

use risk_engine::{GeoPoint, VehicleState};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::RosterError;

/// Roster configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Peers not refreshed for this long are pruned (seconds)
    pub stale_after_s: u64,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self { stale_after_s: 5 }
    }
}

impl RosterConfig {
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_s)
    }
}

/// A peer and when it was last refreshed
#[derive(Debug, Clone)]
pub struct PeerEntry {
    pub vehicle: VehicleState<GeoPoint>,
    pub last_seen: Instant,
}

/// Peers in first-seen order
#[derive(Debug, Clone, Default)]
pub struct PeerRoster {
    entries: Vec<PeerEntry>,
}

impl PeerRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh a peer, returning `true` if it is new
    pub fn upsert(&mut self, vehicle: VehicleState<GeoPoint>) -> Result<bool, RosterError> {
        self.upsert_at(vehicle, Instant::now())
    }

    /// [`upsert`](Self::upsert) with an explicit clock reading
    pub fn upsert_at(&mut self, vehicle: VehicleState<GeoPoint>, now: Instant) -> Result<bool, RosterError> {
        if vehicle.is_ego() {
            return Err(RosterError::NotAPeer(vehicle.id));
        }

        match self.entries.iter_mut().find(|e| e.vehicle.id == vehicle.id) {
            Some(entry) => {
                entry.vehicle = vehicle;
                entry.last_seen = now;
                Ok(false)
            }
            None => {
                debug!("New peer {}", vehicle.id);
                self.entries.push(PeerEntry { vehicle, last_seen: now });
                Ok(true)
            }
        }
    }

    /// Remove a peer by id
    pub fn remove(&mut self, id: &str) -> Option<VehicleState<GeoPoint>> {
        let index = self.entries.iter().position(|e| e.vehicle.id == id)?;
        Some(self.entries.remove(index).vehicle)
    }

    pub fn get(&self, id: &str) -> Option<&VehicleState<GeoPoint>> {
        self.entries.iter().map(|e| &e.vehicle).find(|v| v.id == id)
    }

    /// Copy of all peers in roster order
    pub fn snapshot(&self) -> Vec<VehicleState<GeoPoint>> {
        self.entries.iter().map(|e| e.vehicle.clone()).collect()
    }

    /// Drop peers not refreshed within `max_age`, returning how many went
    pub fn prune_stale(&mut self, max_age: Duration) -> usize {
        self.prune_stale_at(max_age, Instant::now())
    }

    /// [`prune_stale`](Self::prune_stale) with an explicit clock reading
    pub fn prune_stale_at(&mut self, max_age: Duration, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| {
            let fresh = now.saturating_duration_since(e.last_seen) <= max_age;
            if !fresh {
                warn!("Pruning stale peer {}", e.vehicle.id);
            }
            fresh
        });
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut PeerEntry> {
        self.entries.iter_mut()
    }
}
