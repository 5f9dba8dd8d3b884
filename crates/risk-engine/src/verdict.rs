//! Risk levels, threats and the per-tick verdict

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete risk level, totally ordered SAFE < WARNING < DANGER
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    #[default]
    Safe,
    Warning,
    Danger,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Safe => "SAFE",
            RiskLevel::Warning => "WARNING",
            RiskLevel::Danger => "DANGER",
        }
    }

    /// Numeric form for gauges (0, 1, 2)
    pub fn as_index(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of thing the dominant threat is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatType {
    Vehicle,
    Hazard,
    Intersection,
}

/// The dominant threat behind a non-SAFE verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threat {
    /// Threat category
    #[serde(rename = "threat_type")]
    pub kind: ThreatType,

    /// Identity of the vehicle or hazard zone
    #[serde(rename = "threat_id")]
    pub id: String,

    /// Distance to the threat (meters)
    pub distance_m: f64,
}

/// One independently evaluated threat
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub level: RiskLevel,
    pub threat: Threat,
}

/// Result of one evaluation
///
/// `threat` is present iff `level` is not SAFE.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub level: RiskLevel,

    #[serde(flatten)]
    pub threat: Option<Threat>,
}

impl Verdict {
    /// SAFE with no threat fields
    pub fn safe() -> Self {
        Self::default()
    }

    /// Verdict for a single classification; SAFE classifications drop the threat
    pub fn from_classification(classification: Classification) -> Self {
        if classification.level == RiskLevel::Safe {
            return Self::safe();
        }
        Self {
            level: classification.level,
            threat: Some(classification.threat),
        }
    }

    pub fn is_safe(&self) -> bool {
        self.level == RiskLevel::Safe
    }

    /// Distance to the dominant threat (meters)
    pub fn distance_m(&self) -> Option<f64> {
        self.threat.as_ref().map(|t| t.distance_m)
    }

    pub fn threat_type(&self) -> Option<ThreatType> {
        self.threat.as_ref().map(|t| t.kind)
    }

    pub fn threat_id(&self) -> Option<&str> {
        self.threat.as_ref().map(|t| t.id.as_str())
    }
}

impl From<Classification> for Verdict {
    fn from(classification: Classification) -> Self {
        Self::from_classification(classification)
    }
}
