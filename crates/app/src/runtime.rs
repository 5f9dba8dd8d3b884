//! Component wiring and the main event loop

use std::future::Future;
use std::time::{Duration, Instant};

use alerting::{AlertEvent, AlertManager};
use input_validator::Validator;
use monitor::{MonitorStats, RiskMonitor, World};
use peer_roster::PeerSimulator;
use position_source::{PositionService, SimulatedRoute};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::settings::AppConfig;
use crate::AppError;

/// Peer simulation period
const PEER_STEP: Duration = Duration::from_secs(1);

fn report(event: &AlertEvent) {
    debug!(
        "Alert {:?} -> {}: haptic={:?} tone={:?} takeover={}",
        event.from, event.to, event.haptic, event.tone, event.takeover
    );
    if event.takeover {
        warn!("TAKEOVER: {}", event.detail);
    }
}

/// Run until `shutdown` resolves or a component gives out
pub async fn run<F>(config: AppConfig, shutdown: F) -> Result<MonitorStats, AppError>
where
    F: Future<Output = ()>,
{
    let validator = Validator::new(config.validation.clone());
    validator.validate_tunables(&config.engine)?;
    for zone in &config.hazards {
        validator.validate_hazard(zone)?;
    }
    info!("Loaded {} hazard zones", config.hazards.len());

    let world = World::new(config.hazards.clone(), config.engine.clone()).shared();

    let mut simulator = PeerSimulator::new(config.simulation.clone())?;
    {
        let mut world = world.write().await;
        for _ in 0..config.simulation.initial_peers {
            simulator.spawn_near(&mut world.peers, &config.start)?;
        }
    }

    let mut route = SimulatedRoute::new(config.start);
    if let Some(seed) = config.simulation.seed {
        route = route.with_seed(seed);
    }
    let mut positions = PositionService::spawn(route, config.position.clone());

    let (verdict_tx, mut verdicts) = mpsc::channel(config.verdict_buffer.max(1));
    let monitor = RiskMonitor::new(config.monitor.clone(), world.clone(), verdict_tx)
        .with_validator(validator)
        .spawn();

    let mut alerts = AlertManager::new(config.alerts.clone());
    let stale_after = config.roster.stale_after();

    let mut peer_ticker = time::interval(PEER_STEP);
    peer_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // First tick is immediate; peers were just spawned
    peer_ticker.tick().await;

    tokio::pin!(shutdown);
    info!("Collision guard running");

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            fix = positions.next() => match fix {
                Some(fix) => {
                    debug!("Fix ({:.6}, {:.6}) {:.1} km/h", fix.lat, fix.lng, fix.speed_kmh);
                    world.write().await.ego = Some(fix.to_vehicle(config.self_id.as_str()));
                }
                None => {
                    warn!("Position source ended");
                    break;
                }
            },
            _ = peer_ticker.tick() => {
                let mut world = world.write().await;
                simulator.step(&mut world.peers);
                let pruned = world.peers.prune_stale(stale_after);
                if pruned > 0 {
                    warn!("Pruned {} stale peers", pruned);
                }
                alerts.expire_at(Instant::now());
            }
            verdict = verdicts.recv() => match verdict {
                Some(verdict) => {
                    if let Some(event) = alerts.handle(&verdict) {
                        report(&event);
                        if let Ok(json) = serde_json::to_string(&verdict) {
                            info!("Verdict changed: {}", json);
                        }
                    }
                }
                None => {
                    warn!("Monitor stopped delivering verdicts");
                    break;
                }
            },
        }
    }

    let stats = monitor.stop().await?;
    info!("Collision guard stopped");
    Ok(stats)
}
