//! Monitor loop implementation

use std::time::{Duration, Instant};

use input_validator::Validator;
use metrics::{counter, gauge, histogram};
use risk_engine::{RiskEngine, Snapshot, Tunables, Verdict};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::world::SharedWorld;
use crate::MonitorError;

/// Configuration for the risk monitor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Evaluation period in milliseconds (default: 200)
    pub interval_ms: u64,
    /// Drop entities that fail validation before evaluating
    pub validate_scenes: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_ms: 200,
            validate_scenes: true,
        }
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

/// Counters for one monitor run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    /// Ticks that fired
    pub ticks: u64,
    /// Verdicts accepted by the sink
    pub delivered: u64,
    /// Verdicts dropped because the sink was full
    pub dropped: u64,
    /// Vehicles and hazard zones left out of an evaluation as invalid
    pub filtered: u64,
}

/// Periodically evaluates the shared world
pub struct RiskMonitor {
    config: MonitorConfig,
    world: SharedWorld,
    engine: RiskEngine,
    validator: Validator,
    sink: mpsc::Sender<Verdict>,
    stats: MonitorStats,
}

impl RiskMonitor {
    /// Create a new monitor over `world`, delivering verdicts to `sink`
    pub fn new(config: MonitorConfig, world: SharedWorld, sink: mpsc::Sender<Verdict>) -> Self {
        Self {
            config,
            world,
            engine: RiskEngine::new(),
            validator: Validator::default(),
            sink,
            stats: MonitorStats::default(),
        }
    }

    /// Use a custom validator
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Evaluate the world once, returning the verdict and how many
    /// entities were left out as invalid
    pub async fn evaluate_once(&self) -> (Verdict, usize) {
        // Hold the read lock only for the copy
        let (mut scene, tunables) = {
            let world = self.world.read().await;
            (world.scene(), world.tunables.clone())
        };

        let mut filtered = 0;
        if self.config.validate_scenes {
            let (kept, errors) = self.validator.retain_valid(scene);
            scene = kept;
            filtered = errors.len();
            if filtered > 0 {
                counter!("risk_entities_filtered_total").increment(filtered as u64);
            }
        }

        let started = Instant::now();
        let verdict = self.engine.evaluate(&Snapshot::Geo(scene), &tunables);
        histogram!("risk_evaluation_seconds").record(started.elapsed().as_secs_f64());
        counter!("risk_evaluations_total").increment(1);
        gauge!("risk_level").set(verdict.level.as_index() as f64);

        (verdict, filtered)
    }

    /// One tick: evaluate and hand off without waiting on the sink
    async fn tick(&mut self) -> Result<(), MonitorError> {
        self.stats.ticks += 1;

        let (verdict, filtered) = self.evaluate_once().await;
        self.stats.filtered += filtered as u64;

        trace!("Tick {}: {:?}", self.stats.ticks, verdict);
        match self.sink.try_send(verdict) {
            Ok(()) => {
                self.stats.delivered += 1;
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(verdict)) => {
                self.stats.dropped += 1;
                counter!("risk_verdicts_dropped_total").increment(1);
                warn!("Verdict sink full, dropped {} verdict", verdict.level);
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(MonitorError::SinkClosed),
        }
    }

    /// Run until `stop` flips to true or its sender goes away
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) -> Result<MonitorStats, MonitorError> {
        let mut ticker = time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("Starting risk monitor ({}ms interval)", self.config.interval_ms);

        loop {
            if *stop.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.tick().await {
                        warn!("Risk monitor stopping: {}", e);
                        return Err(e);
                    }
                }
                changed = stop.changed() => {
                    if changed.is_err() {
                        debug!("Stop sender dropped");
                        break;
                    }
                }
            }
        }

        info!(
            "Risk monitor stopped after {} ticks ({} delivered, {} dropped, {} filtered)",
            self.stats.ticks, self.stats.delivered, self.stats.dropped, self.stats.filtered
        );
        Ok(self.stats)
    }

    /// Run on a background task
    pub fn spawn(self) -> MonitorHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let world = self.world.clone();
        let validator = self.validator.clone();
        let task = tokio::spawn(self.run(stop_rx));
        MonitorHandle {
            stop: stop_tx,
            task,
            world,
            validator,
        }
    }
}

/// Control side of a spawned monitor
pub struct MonitorHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<Result<MonitorStats, MonitorError>>,
    world: SharedWorld,
    validator: Validator,
}

impl MonitorHandle {
    /// Replace the tunables used from the next tick on
    pub async fn set_tunables(&self, tunables: Tunables) -> Result<(), MonitorError> {
        self.validator.validate_tunables(&tunables)?;
        info!("Updating tunables: {:?}", tunables);
        self.world.write().await.tunables = tunables;
        Ok(())
    }

    /// Whether the loop has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the loop and wait for it to exit
    pub async fn stop(self) -> Result<MonitorStats, MonitorError> {
        info!("Stopping risk monitor");
        // The loop may already be gone; its result is still in the task
        let _ = self.stop.send(true);
        self.task.await.map_err(|e| MonitorError::Task(e.to_string()))?
    }
}
