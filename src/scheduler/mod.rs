//! Guardian control loop.
//!
//! One tick: probe every node concurrently, push each result through the
//! per-node pipeline as soon as it arrives, dispatch any restarts, then
//! publish a fleet snapshot.

use crate::config::GuardianConfig;
use crate::fleet::{FleetSnapshot, GuardianRuntime, NodeState, RestartDecision};
use crate::probe::{HealthCheckPort, HealthProbe};
use crate::restart::{RestartDispatcher, RestartPort};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

/// Drives ticks at a fixed interval until cancelled.
pub struct GuardianScheduler {
    runtime: Arc<GuardianRuntime>,
    probe: HealthProbe,
    dispatcher: RestartDispatcher,
    interval: Duration,
    restart_grace: Duration,
    snapshot_path: Option<PathBuf>,
}

impl GuardianScheduler {
    pub fn new(
        config: &GuardianConfig,
        runtime: Arc<GuardianRuntime>,
        health_check: Arc<dyn HealthCheckPort>,
        restart: Arc<dyn RestartPort>,
    ) -> Self {
        let dispatcher = RestartDispatcher::new(restart, Arc::clone(runtime.alerts()));
        Self {
            runtime,
            probe: HealthProbe::new(health_check, config.guardian.probe_timeout()),
            dispatcher,
            interval: config.guardian.interval(),
            restart_grace: config.restart.command_timeout(),
            snapshot_path: config.status.snapshot_path.clone(),
        }
    }

    pub fn runtime(&self) -> &Arc<GuardianRuntime> {
        &self.runtime
    }

    pub fn dispatcher(&self) -> &RestartDispatcher {
        &self.dispatcher
    }

    /// Run a single tick.
    pub async fn tick(&self) -> FleetSnapshot {
        let mut probes = JoinSet::new();
        for target in self.runtime.targets() {
            let probe = self.probe.clone();
            probes.spawn(async move {
                let result = probe.probe(&target.address).await;
                (target.name, result)
            });
        }

        // Results are applied in completion order; a slow node never holds
        // back the others.
        while let Some(joined) = probes.join_next().await {
            let (name, result) = match joined {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::error!(error = %e, "Probe task failed");
                    continue;
                }
            };

            let Some(step) = self.runtime.apply_probe(&name, &result, Utc::now()) else {
                continue;
            };
            if let RestartDecision::Restarted(order) = step.decision {
                self.dispatcher.dispatch(order);
            }
        }

        let snapshot = self.runtime.publish_snapshot();
        tracing::debug!(
            healthy = snapshot.count(NodeState::Healthy),
            unhealthy = snapshot.count(NodeState::Unhealthy),
            crashed = snapshot.count(NodeState::Crashed),
            restarting = snapshot.count(NodeState::Restarting),
            guardian_active = snapshot.guardian_active,
            "Guardian tick completed"
        );
        self.persist(&snapshot).await;
        snapshot
    }

    /// Loop until `cancel_token` fires, then wait (bounded) for in-flight
    /// restart commands and flush a final snapshot.
    pub async fn run(self, cancel_token: CancellationToken) -> FleetSnapshot {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tracing::info!(
            interval_seconds = self.interval.as_secs(),
            nodes = self.runtime.node_count(),
            guardian_active = self.runtime.is_active(),
            "Guardian started"
        );

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    tracing::info!("Guardian shutting down");
                    break;
                }
                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }

        self.dispatcher.shutdown(self.restart_grace).await;

        let snapshot = self.runtime.publish_snapshot();
        tracing::info!(
            snapshot = %serde_json::to_string(&snapshot).unwrap_or_default(),
            "Final fleet snapshot"
        );
        self.persist(&snapshot).await;
        snapshot
    }

    /// Spawn the loop on the runtime.
    pub fn start(self, cancel_token: CancellationToken) -> JoinHandle<FleetSnapshot> {
        tokio::spawn(self.run(cancel_token))
    }

    async fn persist(&self, snapshot: &FleetSnapshot) {
        let Some(path) = &self.snapshot_path else {
            return;
        };
        if let Err(e) = write_snapshot(path, snapshot).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to write status snapshot");
        }
    }
}

/// Write-then-rename so readers never see a half-written file.
async fn write_snapshot(path: &Path, snapshot: &FleetSnapshot) -> std::io::Result<()> {
    let body = serde_json::to_vec_pretty(snapshot)?;
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, path).await
}
