//! Async position service for tokio

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::{PositionError, PositionFix, PositionSource};

/// Position service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionConfig {
    /// Polling period (milliseconds)
    pub interval_ms: u64,
    /// Fix channel capacity
    pub channel_capacity: usize,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            channel_capacity: 16,
        }
    }
}

/// Polls a [`PositionSource`] on a background task
pub struct PositionService {
    receiver: mpsc::Receiver<PositionFix>,
    task: JoinHandle<()>,
}

impl PositionService {
    /// Spawn the polling task; must be called inside a tokio runtime
    pub fn spawn<S>(mut source: S, config: PositionConfig) -> Self
    where
        S: PositionSource + 'static,
    {
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        let period = Duration::from_millis(config.interval_ms.max(1));

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!("Position service started ({}ms period)", period.as_millis());

            loop {
                ticker.tick().await;
                match source.next_fix() {
                    Ok(fix) => {
                        if tx.send(fix).await.is_err() {
                            debug!("Position receiver dropped");
                            break;
                        }
                    }
                    Err(PositionError::Exhausted) => {
                        info!("Position source exhausted");
                        break;
                    }
                    Err(e) => {
                        warn!("Position read error: {}", e);
                    }
                }
            }
        });

        Self { receiver: rx, task }
    }

    /// Receive next fix; `None` once the source is exhausted
    pub async fn next(&mut self) -> Option<PositionFix> {
        self.receiver.recv().await
    }
}

impl Drop for PositionService {
    fn drop(&mut self) {
        self.task.abort();
    }
}
