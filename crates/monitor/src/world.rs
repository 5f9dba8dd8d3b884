//! Shared world state read by the monitor

use std::sync::Arc;

use peer_roster::PeerRoster;
use risk_engine::{GeoPoint, GeoScene, HazardZone, Snapshot, Tunables, VehicleState};
use tokio::sync::RwLock;

/// Everything one evaluation needs
#[derive(Debug, Clone, Default)]
pub struct World {
    /// Latest self-vehicle state, `None` until the first fix
    pub ego: Option<VehicleState<GeoPoint>>,
    pub peers: PeerRoster,
    pub hazards: Vec<HazardZone>,
    pub tunables: Tunables,
}

/// World behind an async read/write lock
pub type SharedWorld = Arc<RwLock<World>>;

impl World {
    pub fn new(hazards: Vec<HazardZone>, tunables: Tunables) -> Self {
        Self {
            hazards,
            tunables,
            ..Default::default()
        }
    }

    pub fn shared(self) -> SharedWorld {
        Arc::new(RwLock::new(self))
    }

    /// Copy of the scene: self first, then peers in roster order
    pub fn scene(&self) -> GeoScene {
        let mut vehicles = Vec::with_capacity(self.peers.len() + 1);
        vehicles.extend(self.ego.iter().cloned());
        vehicles.extend(self.peers.snapshot());
        GeoScene::new(vehicles, self.hazards.clone())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::Geo(self.scene())
    }
}
