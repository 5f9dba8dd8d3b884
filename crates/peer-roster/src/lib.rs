//! Peer Vehicle Roster
//!
//! Keeps the other vehicles the risk engine evaluates against:
//! - Insertion-ordered roster (order drives arbitration tie-breaks)
//! - Last-seen tracking and stale peer pruning
//! - Offline simulator that moves peers inside a bounding box

mod roster;
mod simulator;

pub use roster::{PeerEntry, PeerRoster, RosterConfig};
pub use simulator::{Bounds, PeerSimulator, SimulationConfig};

use thiserror::Error;

/// Roster error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RosterError {
    #[error("Vehicle {0} is the self vehicle, not a peer")]
    NotAPeer(String),

    #[error("Invalid simulation config: {0}")]
    InvalidConfig(String),
}
