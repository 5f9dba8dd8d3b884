//! Alert Manager Implementation

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use risk_engine::{RiskLevel, ThreatType, Verdict};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cues::{AlertTone, HapticPattern};

/// Driver-facing alert toggles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertSettings {
    /// Full-screen takeover on DANGER
    pub visual_alerts: bool,
    /// Audio tones
    pub audio_alerts: bool,
    /// Haptic patterns
    pub vibration_alerts: bool,
    /// Carried for display only; nothing brakes
    pub autobrake: bool,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            visual_alerts: true,
            audio_alerts: true,
            vibration_alerts: true,
            autobrake: false,
        }
    }
}

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Transitions kept in the history
    pub history_len: usize,
    /// Takeover auto-dismiss delay (seconds)
    pub takeover_seconds: u64,
    /// Initial toggles
    pub settings: AlertSettings,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            history_len: 5,
            takeover_seconds: 5,
            settings: AlertSettings::default(),
        }
    }
}

/// One history entry
#[derive(Debug, Clone, Serialize)]
pub struct AlertRecord {
    pub time: DateTime<Utc>,
    pub level: RiskLevel,
    pub message: &'static str,
}

/// Active full-screen takeover
#[derive(Debug, Clone)]
pub struct Takeover {
    pub level: RiskLevel,
    /// Threat line shown under the title
    pub detail: String,
    pub raised_at: Instant,
}

/// Everything a level transition asks the device to do
#[derive(Debug, Clone)]
pub struct AlertEvent {
    pub from: Option<RiskLevel>,
    pub to: RiskLevel,
    pub message: &'static str,
    pub detail: String,
    pub haptic: Option<HapticPattern>,
    pub tone: Option<AlertTone>,
    pub takeover: bool,
}

/// History line for a level
pub fn level_message(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Danger => "COLLISION RISK DETECTED - Immediate action required",
        RiskLevel::Warning => "Potential collision risk - Maintain safe distance",
        RiskLevel::Safe => "All clear - Safe to proceed",
    }
}

/// Threat line for a verdict
pub fn threat_message(verdict: &Verdict) -> String {
    match (&verdict.threat, verdict.level) {
        (Some(threat), RiskLevel::Warning | RiskLevel::Danger) => match threat.kind {
            ThreatType::Vehicle => format!("Vehicle detected {:.0}m ahead", threat.distance_m),
            ThreatType::Hazard => format!("Hazard zone {:.0}m ahead", threat.distance_m),
            ThreatType::Intersection => format!("Intersection {:.0}m ahead", threat.distance_m),
        },
        _ => "Check surroundings carefully".to_string(),
    }
}

/// Tracks the current level and reacts to transitions
pub struct AlertManager {
    config: AlertConfig,
    settings: AlertSettings,
    /// In-session mute, independent of the audio setting
    audio_muted: bool,
    current: Option<RiskLevel>,
    /// Newest first
    history: VecDeque<AlertRecord>,
    takeover: Option<Takeover>,
}

impl AlertManager {
    /// Create a new alert manager
    pub fn new(config: AlertConfig) -> Self {
        info!("Creating alert manager with config: {:?}", config);
        Self {
            settings: config.settings.clone(),
            history: VecDeque::with_capacity(config.history_len),
            config,
            audio_muted: false,
            current: None,
            takeover: None,
        }
    }

    /// Feed one verdict; returns an event only when the level changed
    pub fn handle(&mut self, verdict: &Verdict) -> Option<AlertEvent> {
        self.handle_at(verdict, Instant::now())
    }

    /// [`handle`](Self::handle) with an explicit clock reading
    pub fn handle_at(&mut self, verdict: &Verdict, now: Instant) -> Option<AlertEvent> {
        self.expire_at(now);

        let from = self.current;
        if from == Some(verdict.level) {
            return None;
        }
        self.current = Some(verdict.level);

        let level = verdict.level;
        let message = level_message(level);
        let detail = threat_message(verdict);

        self.history.push_front(AlertRecord {
            time: Utc::now(),
            level,
            message,
        });
        self.history.truncate(self.config.history_len);

        let haptic = HapticPattern::for_level(level).filter(|_| self.settings.vibration_alerts);
        let tone = AlertTone::for_level(level).filter(|_| self.settings.audio_alerts && !self.audio_muted);

        let takeover = level == RiskLevel::Danger && self.settings.visual_alerts;
        if takeover {
            self.takeover = Some(Takeover {
                level,
                detail: detail.clone(),
                raised_at: now,
            });
        } else if level == RiskLevel::Safe && self.takeover.take().is_some() {
            debug!("Takeover cleared on return to SAFE");
        }

        match level {
            RiskLevel::Danger => warn!("{} ({})", message, detail),
            RiskLevel::Warning => info!("{} ({})", message, detail),
            RiskLevel::Safe => info!("{}", message),
        }

        Some(AlertEvent {
            from,
            to: level,
            message,
            detail,
            haptic,
            tone,
            takeover,
        })
    }

    /// Dismiss the takeover if its time is up, returning `true` if it went
    pub fn expire_at(&mut self, now: Instant) -> bool {
        let limit = Duration::from_secs(self.config.takeover_seconds);
        let expired = self
            .takeover
            .as_ref()
            .is_some_and(|t| now.saturating_duration_since(t.raised_at) >= limit);
        if expired {
            debug!("Takeover auto-dismissed");
            self.takeover = None;
        }
        expired
    }

    /// Driver acknowledged the takeover
    pub fn acknowledge(&mut self) -> bool {
        let dismissed = self.takeover.take().is_some();
        if dismissed {
            info!("Takeover acknowledged");
        }
        dismissed
    }

    /// Seconds left before auto-dismiss, rounded up
    pub fn takeover_countdown_at(&self, now: Instant) -> Option<u64> {
        let takeover = self.takeover.as_ref()?;
        let limit = Duration::from_secs(self.config.takeover_seconds);
        let remaining = limit.checked_sub(now.saturating_duration_since(takeover.raised_at))?;
        if remaining.is_zero() {
            return None;
        }
        Some(remaining.as_millis().div_ceil(1000) as u64)
    }

    pub fn takeover(&self) -> Option<&Takeover> {
        self.takeover.as_ref()
    }

    pub fn current_level(&self) -> RiskLevel {
        self.current.unwrap_or_default()
    }

    /// Newest first
    pub fn history(&self) -> impl Iterator<Item = &AlertRecord> {
        self.history.iter()
    }

    pub fn settings(&self) -> &AlertSettings {
        &self.settings
    }

    /// Replace toggles; turning visual alerts off drops any takeover
    pub fn set_settings(&mut self, settings: AlertSettings) {
        if !settings.visual_alerts {
            self.takeover = None;
        }
        self.settings = settings;
    }

    pub fn set_audio_muted(&mut self, muted: bool) {
        self.audio_muted = muted;
    }

    /// Forget history and state
    pub fn clear(&mut self) {
        self.history.clear();
        self.current = None;
        self.takeover = None;
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}
