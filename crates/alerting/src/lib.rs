//! Alerting System
//!
//! Turns risk level transitions into driver-facing alerts: a short
//! history, haptic and audio cues, and a full-screen takeover on DANGER.

mod cues;
mod manager;

pub use cues::{AlertTone, HapticPattern, ToneStep};
pub use manager::{level_message, threat_message, AlertConfig, AlertEvent, AlertManager, AlertRecord, AlertSettings, Takeover};
