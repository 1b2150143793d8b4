//! Process-wide guardian state.

use super::accumulator::FailureAccumulator;
use super::error::FleetError;
use super::guard::FleetGuard;
use super::machine::{NodeStateMachine, Transition};
use super::node::{FleetSnapshot, Node, NodeSnapshot, NodeState};
use super::orchestrator::{RestartDecision, RestartOrchestrator};
use crate::alerts::{AlertEvent, AlertSink};
use crate::config::{GuardianConfig, GuardianSettings};
use crate::probe::ProbeResult;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

/// Where to probe one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub name: String,
    pub address: String,
}

/// Everything one probe result did to one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStep {
    pub node: String,
    pub transition: Transition,
    pub decision: RestartDecision,
}

/// Shared mutable state of a running guardian.
///
/// The node list sits behind a single mutex. Each probe result is applied
/// (failure count, transition, FleetGuard check, restart decision) while
/// holding it, so FleetGuard always reads a consistent fleet and two nodes
/// can never both be admitted to `Crashed` on the same stale view.
pub struct GuardianRuntime {
    nodes: Mutex<Vec<Node>>,
    machine: NodeStateMachine,
    orchestrator: RestartOrchestrator,
    active: AtomicBool,
    alerts: Arc<AlertSink>,
    snapshots: watch::Sender<FleetSnapshot>,
}

impl GuardianRuntime {
    /// Build the runtime from validated configuration: every node Healthy,
    /// all counters zero.
    pub fn new(config: &GuardianConfig) -> Self {
        let nodes = config.nodes.iter().map(Node::from_config).collect();
        Self::from_nodes(nodes, &config.guardian)
    }

    pub fn from_nodes(nodes: Vec<Node>, settings: &GuardianSettings) -> Self {
        let machine = NodeStateMachine::new(
            FailureAccumulator::new(settings.max_failures),
            FleetGuard::new(settings.availability_floor),
            settings.restart_confirmation_timeout(),
        );
        let orchestrator = RestartOrchestrator::new(settings.max_failures, settings.max_restarts);

        let initial = FleetSnapshot {
            taken_at: Utc::now(),
            guardian_active: settings.start_active,
            availability_floor: settings.availability_floor,
            nodes: nodes.iter().map(Node::snapshot).collect(),
        };
        let (snapshots, _) = watch::channel(initial);

        Self {
            nodes: Mutex::new(nodes),
            machine,
            orchestrator,
            active: AtomicBool::new(settings.start_active),
            alerts: Arc::new(AlertSink::default()),
            snapshots,
        }
    }

    fn lock_nodes(&self) -> MutexGuard<'_, Vec<Node>> {
        // Every write under this lock is a plain field store; a poisoned
        // lock still guards consistent records.
        self.nodes.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn node_count(&self) -> usize {
        self.lock_nodes().len()
    }

    pub fn targets(&self) -> Vec<ProbeTarget> {
        self.lock_nodes()
            .iter()
            .map(|n| ProbeTarget {
                name: n.name().to_string(),
                address: n.address().to_string(),
            })
            .collect()
    }

    /// Whether automated actions (crash marking, restarts) are enabled.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Pause or resume automated actions. Returns the previous value.
    pub fn set_active(&self, active: bool) -> bool {
        let previous = self.active.swap(active, Ordering::SeqCst);
        if previous != active {
            tracing::info!(guardian_active = active, "Guardian automation toggled");
        }
        previous
    }

    pub fn alerts(&self) -> &Arc<AlertSink> {
        &self.alerts
    }

    pub fn availability_floor(&self) -> usize {
        self.machine.guard().availability_floor()
    }

    /// Run one probe result through the per-node pipeline.
    ///
    /// Returns `None` for a node that is not part of the fleet.
    pub fn apply_probe(
        &self,
        name: &str,
        probe: &ProbeResult,
        now: DateTime<Utc>,
    ) -> Option<NodeStep> {
        let active = self.is_active();

        let (step, snapshot) = {
            let mut nodes = self.lock_nodes();
            let index = nodes.iter().position(|n| n.name() == name)?;

            let transition = self.machine.step(&mut nodes, index, probe, active, now);
            let decision = if active {
                self.orchestrator.maybe_restart(&mut nodes[index], now)
            } else {
                RestartDecision::NotEligible
            };

            (
                NodeStep {
                    node: name.to_string(),
                    transition,
                    decision,
                },
                nodes[index].snapshot(),
            )
        };

        self.report_step(&step, &snapshot);
        Some(step)
    }

    fn report_step(&self, step: &NodeStep, snapshot: &NodeSnapshot) {
        let t = &step.transition;

        if t.changed() {
            tracing::info!(
                node = %step.node,
                old_state = %t.from,
                new_state = %t.to,
                failure_count = t.failure_count,
                "Node state changed"
            );
        } else {
            tracing::debug!(
                node = %step.node,
                state = %t.to,
                failure_count = t.failure_count,
                "Node probed"
            );
        }

        for alert in &t.alerts {
            self.alerts.emit(alert.clone());
        }

        match &step.decision {
            RestartDecision::Restarted(order) => {
                metrics::counter!("guardian_restarts_total", "node" => step.node.clone())
                    .increment(1);
                tracing::info!(
                    node = %step.node,
                    attempt = order.attempt,
                    max_restarts = self.orchestrator.max_restarts(),
                    "Restart issued"
                );
            }
            RestartDecision::BudgetExhausted {
                newly_escalated: true,
            } => {
                self.alerts.emit(AlertEvent::RestartBudgetExhausted {
                    node: step.node.clone(),
                    restart_count: snapshot.restart_count,
                });
            }
            RestartDecision::BudgetExhausted {
                newly_escalated: false,
            }
            | RestartDecision::NotEligible => {}
        }
    }

    /// Operator action: clear a node's restart count and escalation.
    pub fn reset_restart_budget(&self, name: &str) -> Result<NodeSnapshot, FleetError> {
        let snapshot = {
            let mut nodes = self.lock_nodes();
            let node = nodes
                .iter_mut()
                .find(|n| n.name() == name)
                .ok_or_else(|| FleetError::UnknownNode(name.to_string()))?;
            self.orchestrator.reset_budget(node);
            node.snapshot()
        };

        tracing::info!(node = name, "Restart budget reset by operator");
        Ok(snapshot)
    }

    pub fn node(&self, name: &str) -> Option<NodeSnapshot> {
        self.lock_nodes()
            .iter()
            .find(|n| n.name() == name)
            .map(Node::snapshot)
    }

    /// Consistent view of every node.
    pub fn snapshot(&self) -> FleetSnapshot {
        let nodes = self.lock_nodes().iter().map(Node::snapshot).collect();
        FleetSnapshot {
            taken_at: Utc::now(),
            guardian_active: self.is_active(),
            availability_floor: self.availability_floor(),
            nodes,
        }
    }

    /// Take a snapshot and publish it to watchers and metrics.
    pub fn publish_snapshot(&self) -> FleetSnapshot {
        let snapshot = self.snapshot();
        crate::metrics::record_snapshot(&snapshot);
        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }

    /// Latest published snapshot.
    pub fn watch_snapshots(&self) -> watch::Receiver<FleetSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn crashed_count(&self) -> usize {
        self.lock_nodes()
            .iter()
            .filter(|n| n.state() == NodeState::Crashed)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeRole;

    fn runtime(names: &[&str]) -> GuardianRuntime {
        let nodes = names
            .iter()
            .map(|n| Node::new(*n, format!("http://{}:8080", n), NodeRole::Primary, *n))
            .collect();
        GuardianRuntime::from_nodes(nodes, &GuardianSettings::default())
    }

    #[test]
    fn test_starts_all_healthy_and_active() {
        let rt = runtime(&["a", "b"]);
        let snap = rt.snapshot();
        assert!(snap.guardian_active);
        assert_eq!(snap.count(NodeState::Healthy), 2);
        assert_eq!(rt.targets().len(), 2);
    }

    #[test]
    fn test_apply_probe_unknown_node() {
        let rt = runtime(&["a"]);
        assert!(rt
            .apply_probe("zzz", &ProbeResult::healthy(1), Utc::now())
            .is_none());
    }

    #[test]
    fn test_threshold_triggers_restart_decision() {
        let rt = runtime(&["a", "b"]);
        let now = Utc::now();
        rt.apply_probe("a", &ProbeResult::soft_failure(1), now);
        rt.apply_probe("a", &ProbeResult::soft_failure(1), now);
        let step = rt
            .apply_probe("a", &ProbeResult::soft_failure(1), now)
            .unwrap();
        assert!(matches!(step.decision, RestartDecision::Restarted(_)));
        assert_eq!(rt.node("a").unwrap().state, NodeState::Restarting);
    }

    #[test]
    fn test_paused_suppresses_restart() {
        let rt = runtime(&["a", "b"]);
        assert!(rt.set_active(false));
        let now = Utc::now();
        for _ in 0..5 {
            let step = rt
                .apply_probe("a", &ProbeResult::soft_failure(1), now)
                .unwrap();
            assert_eq!(step.decision, RestartDecision::NotEligible);
        }
        let node = rt.node("a").unwrap();
        assert_eq!(node.state, NodeState::Unhealthy);
        assert_eq!(node.failure_count, 3);
        assert_eq!(node.restart_count, 0);
    }

    #[test]
    fn test_reset_unknown_node() {
        let rt = runtime(&["a"]);
        assert_eq!(
            rt.reset_restart_budget("b"),
            Err(FleetError::UnknownNode("b".to_string()))
        );
    }

    #[test]
    fn test_publish_snapshot_updates_watch() {
        let rt = runtime(&["a"]);
        let rx = rt.watch_snapshots();
        rt.apply_probe("a", &ProbeResult::soft_failure(1), Utc::now());
        rt.publish_snapshot();
        assert_eq!(rx.borrow().nodes[0].state, NodeState::Unhealthy);
    }
}
