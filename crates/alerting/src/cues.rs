//! Haptic and audio cue definitions

use risk_engine::RiskLevel;
use serde::Serialize;

/// Vibrate / pause durations, alternating, starting with vibrate (ms)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HapticPattern(pub &'static [u64]);

impl HapticPattern {
    pub const DANGER: HapticPattern = HapticPattern(&[200, 100, 200, 100, 200]);
    pub const WARNING: HapticPattern = HapticPattern(&[100, 50, 100]);

    /// Pattern for a level, none for SAFE
    pub fn for_level(level: RiskLevel) -> Option<Self> {
        match level {
            RiskLevel::Danger => Some(Self::DANGER),
            RiskLevel::Warning => Some(Self::WARNING),
            RiskLevel::Safe => None,
        }
    }

    /// Whole pattern length (ms)
    pub fn total_ms(&self) -> u64 {
        self.0.iter().sum()
    }
}

/// Frequency change at an offset into a tone
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToneStep {
    pub at_ms: u64,
    pub frequency_hz: f64,
}

/// A short alert tone that decays from `gain` over `duration_ms`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlertTone {
    pub steps: &'static [ToneStep],
    pub gain: f64,
    pub duration_ms: u64,
}

impl AlertTone {
    /// Two-step falling siren
    pub const DANGER: AlertTone = AlertTone {
        steps: &[
            ToneStep { at_ms: 0, frequency_hz: 800.0 },
            ToneStep { at_ms: 100, frequency_hz: 400.0 },
        ],
        gain: 0.3,
        duration_ms: 500,
    };

    pub const WARNING: AlertTone = AlertTone {
        steps: &[ToneStep { at_ms: 0, frequency_hz: 600.0 }],
        gain: 0.2,
        duration_ms: 300,
    };

    /// Tone for a level, none for SAFE
    pub fn for_level(level: RiskLevel) -> Option<Self> {
        match level {
            RiskLevel::Danger => Some(Self::DANGER),
            RiskLevel::Warning => Some(Self::WARNING),
            RiskLevel::Safe => None,
        }
    }

    /// Frequency playing `ms` into the tone, `None` once it has stopped
    pub fn frequency_at(&self, ms: u64) -> Option<f64> {
        if ms >= self.duration_ms {
            return None;
        }
        self.steps
            .iter()
            .take_while(|step| step.at_ms <= ms)
            .last()
            .map(|step| step.frequency_hz)
    }
}
