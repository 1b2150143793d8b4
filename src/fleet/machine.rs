//! Per-node state transitions.

use super::accumulator::FailureAccumulator;
use super::guard::FleetGuard;
use super::node::{Node, NodeState};
use crate::alerts::AlertEvent;
use crate::probe::ProbeResult;
use chrono::{DateTime, Utc};

/// Result of applying one probe to one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: NodeState,
    pub to: NodeState,
    pub failure_count: u32,
    pub alerts: Vec<AlertEvent>,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Deterministic transition function: one probe result, one step.
///
/// `step` sees the whole node slice because entering `Crashed` is gated by
/// [`FleetGuard`]; the caller holds the fleet lock for the duration.
#[derive(Debug, Clone)]
pub struct NodeStateMachine {
    accumulator: FailureAccumulator,
    guard: FleetGuard,
    confirmation_timeout: chrono::Duration,
}

impl NodeStateMachine {
    pub fn new(
        accumulator: FailureAccumulator,
        guard: FleetGuard,
        confirmation_timeout: std::time::Duration,
    ) -> Self {
        Self {
            accumulator,
            guard,
            confirmation_timeout: chrono::Duration::from_std(confirmation_timeout)
                .unwrap_or(chrono::Duration::MAX),
        }
    }

    pub fn guard(&self) -> &FleetGuard {
        &self.guard
    }

    /// Apply `probe` to `nodes[index]`.
    ///
    /// With `active == false` the FleetGuard-gated Crashed transition is
    /// suppressed; failure accounting and the other transitions still run.
    pub fn step(
        &self,
        nodes: &mut [Node],
        index: usize,
        probe: &ProbeResult,
        active: bool,
        now: DateTime<Utc>,
    ) -> Transition {
        let from = nodes[index].state;
        let failure_count = self
            .accumulator
            .on_probe_result(nodes[index].failure_count, probe.verdict);

        {
            let node = &mut nodes[index];
            node.failure_count = failure_count;
            node.last_probe_at = Some(now);
            node.last_latency_ms = Some(probe.latency_ms);
            node.last_error = probe.error.clone();
        }

        let mut alerts = Vec::new();
        let to = if probe.is_healthy() {
            NodeState::Healthy
        } else {
            match from {
                NodeState::Crashed => NodeState::Crashed,
                NodeState::Restarting => match self.unconfirmed_for(&nodes[index], now) {
                    Some(waited) if waited < self.confirmation_timeout => NodeState::Restarting,
                    waited => {
                        alerts.push(AlertEvent::RestartConfirmationTimeout {
                            node: nodes[index].name().to_string(),
                            waited_seconds: waited.map_or(0, |w| w.num_seconds().max(0) as u64),
                        });
                        self.after_failure(nodes, index, probe, active, &mut alerts)
                    }
                },
                NodeState::Healthy | NodeState::Unhealthy => {
                    self.after_failure(nodes, index, probe, active, &mut alerts)
                }
            }
        };

        nodes[index].state = to;

        Transition {
            from,
            to,
            failure_count,
            alerts,
        }
    }

    /// Target state for a failed probe on a node that is (or falls back to
    /// being) in the ordinary failure cycle.
    fn after_failure(
        &self,
        nodes: &[Node],
        index: usize,
        probe: &ProbeResult,
        active: bool,
        alerts: &mut Vec<AlertEvent>,
    ) -> NodeState {
        if !(probe.hard_failure && active) {
            return NodeState::Unhealthy;
        }

        if self.guard.may_crash(nodes.iter().map(Node::state)) {
            NodeState::Crashed
        } else {
            alerts.push(AlertEvent::CrashDenied {
                node: nodes[index].name().to_string(),
                crashed: nodes
                    .iter()
                    .filter(|n| n.state() == NodeState::Crashed)
                    .count(),
                fleet_size: nodes.len(),
                availability_floor: self.guard.availability_floor(),
            });
            NodeState::Unhealthy
        }
    }

    fn unconfirmed_for(&self, node: &Node, now: DateTime<Utc>) -> Option<chrono::Duration> {
        node.last_restart_at.map(|at| now - at)
    }
}
