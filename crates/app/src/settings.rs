//! Layered application configuration

use std::path::Path;

use alerting::AlertConfig;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use input_validator::ValidationConfig;
use monitor::MonitorConfig;
use peer_roster::{RosterConfig, SimulationConfig};
use position_source::route::DEFAULT_START;
use position_source::PositionConfig;
use risk_engine::{GeoPoint, HazardCategory, HazardZone, Tunables};
use serde::{Deserialize, Serialize};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "collision-guard";

/// Prefix for environment overrides, e.g. `COLLISION_GUARD__ENGINE__SAFE_DISTANCE_M`
pub const ENV_PREFIX: &str = "COLLISION_GUARD";

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Prometheus exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub listen_addr: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "0.0.0.0:9091".to_string(),
        }
    }
}

/// Complete runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Identity of the self vehicle
    pub self_id: String,
    /// Where the simulated route starts
    pub start: GeoPoint,
    /// Verdict channel capacity between monitor and alerting
    pub verdict_buffer: usize,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
    pub engine: Tunables,
    pub validation: ValidationConfig,
    pub monitor: MonitorConfig,
    pub position: PositionConfig,
    pub simulation: SimulationConfig,
    pub roster: RosterConfig,
    pub alerts: AlertConfig,
    pub hazards: Vec<HazardZone>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            self_id: "user".to_string(),
            start: DEFAULT_START,
            verdict_buffer: 32,
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
            engine: Tunables::default(),
            validation: ValidationConfig::default(),
            monitor: MonitorConfig::default(),
            position: PositionConfig::default(),
            simulation: SimulationConfig::default(),
            roster: RosterConfig::default(),
            alerts: AlertConfig::default(),
            hazards: default_hazards(),
        }
    }
}

/// Hazard zones used when none are configured
pub fn default_hazards() -> Vec<HazardZone> {
    vec![
        HazardZone::new("intersection-1", GeoPoint::new(28.6150, 77.2095), 50.0, HazardCategory::Intersection),
        HazardZone::new("school-1", GeoPoint::new(28.6130, 77.2085), 30.0, HazardCategory::School),
        HazardZone::new("hospital-1", GeoPoint::new(28.6160, 77.2100), 40.0, HazardCategory::Hospital),
    ]
}

impl AppConfig {
    /// Defaults, then the config file (optional unless `path` is given),
    /// then `COLLISION_GUARD__*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(CONFIG_FILE).required(false),
        };
        Self::build(Config::builder().add_source(file))
    }

    /// Defaults overlaid with an inline TOML document
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Self::build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    fn build(builder: ConfigBuilder<config::builder::DefaultState>) -> Result<Self, ConfigError> {
        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
