//! Engine tunables

use serde::{Deserialize, Serialize};

/// Detection sensitivity (planar strategy only)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    /// Relaxed detection
    Low,
    /// Balanced detection
    #[default]
    Medium,
    /// Aggressive detection
    High,
}

impl Sensitivity {
    /// Threshold multiplier for this sensitivity
    pub fn multiplier(self) -> f64 {
        match self {
            Sensitivity::Low => 0.7,
            Sensitivity::Medium => 1.0,
            Sensitivity::High => 1.3,
        }
    }
}

/// How the geo strategy estimates the closing rate between two vehicles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosingModel {
    /// Sum of both scalar speeds, as if driving straight at each other
    #[default]
    ScalarSum,
    /// Relative velocity projected onto the line of sight
    LineOfSight,
}

/// Externally owned tunables, read-only per evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Baseline following distance (meters)
    pub safe_distance_m: f64,

    /// Scales the dynamic safe distance into the warning band (>= 1)
    pub proximity_multiplier: f64,

    /// Planar strategy sensitivity
    pub sensitivity: Sensitivity,

    /// Closing-rate model for geo time-to-collision
    pub closing_model: ClosingModel,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            safe_distance_m: 50.0,
            proximity_multiplier: 2.0,
            sensitivity: Sensitivity::Medium,
            closing_model: ClosingModel::ScalarSum,
        }
    }
}
