//! Per-node health record.

use crate::config::{NodeConfig, NodeRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical health state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    /// Last probe succeeded
    Healthy,
    /// One or more consecutive failures, not yet acted on
    Unhealthy,
    /// Definitive down-signal, admitted by FleetGuard
    Crashed,
    /// Restart issued, waiting for a healthy probe
    Restarting,
}

impl NodeState {
    pub const ALL: [NodeState; 4] = [
        NodeState::Healthy,
        NodeState::Unhealthy,
        NodeState::Crashed,
        NodeState::Restarting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeState::Healthy => "healthy",
            NodeState::Unhealthy => "unhealthy",
            NodeState::Crashed => "crashed",
            NodeState::Restarting => "restarting",
        }
    }

    /// States a restart may be issued from
    pub fn is_restartable(&self) -> bool {
        matches!(self, NodeState::Unhealthy | NodeState::Crashed)
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One monitored backend instance.
///
/// Fields are only writable from within the `fleet` module: the state
/// machine and the restart orchestrator are the sole mutators.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    address: String,
    role: NodeRole,
    unit: String,
    pub(super) state: NodeState,
    pub(super) failure_count: u32,
    pub(super) restart_count: u32,
    pub(super) escalated: bool,
    pub(super) last_probe_at: Option<DateTime<Utc>>,
    pub(super) last_latency_ms: Option<u64>,
    pub(super) last_error: Option<String>,
    pub(super) last_restart_at: Option<DateTime<Utc>>,
}

impl Node {
    /// A freshly started node: Healthy with zero counters.
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        role: NodeRole,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            role,
            unit: unit.into(),
            state: NodeState::Healthy,
            failure_count: 0,
            restart_count: 0,
            escalated: false,
            last_probe_at: None,
            last_latency_ms: None,
            last_error: None,
            last_restart_at: None,
        }
    }

    pub fn from_config(config: &NodeConfig) -> Self {
        Self::new(&config.name, &config.address, config.role, config.unit())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    pub fn restart_count(&self) -> u32 {
        self.restart_count
    }

    pub fn is_escalated(&self) -> bool {
        self.escalated
    }

    pub fn last_restart_at(&self) -> Option<DateTime<Utc>> {
        self.last_restart_at
    }

    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            name: self.name.clone(),
            address: self.address.clone(),
            role: self.role,
            state: self.state,
            failure_count: self.failure_count,
            restart_count: self.restart_count,
            escalated: self.escalated,
            last_probe_at: self.last_probe_at,
            last_latency_ms: self.last_latency_ms,
            last_error: self.last_error.clone(),
            last_restart_at: self.last_restart_at,
        }
    }
}

/// Point-in-time view of one node, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub name: String,
    pub address: String,
    pub role: NodeRole,
    pub state: NodeState,
    pub failure_count: u32,
    pub restart_count: u32,
    pub escalated: bool,
    pub last_probe_at: Option<DateTime<Utc>>,
    pub last_latency_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub last_restart_at: Option<DateTime<Utc>>,
}

/// Point-in-time view of the whole fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    pub taken_at: DateTime<Utc>,
    pub guardian_active: bool,
    pub availability_floor: usize,
    pub nodes: Vec<NodeSnapshot>,
}

impl FleetSnapshot {
    pub fn count(&self, state: NodeState) -> usize {
        self.nodes.iter().filter(|n| n.state == state).count()
    }

    pub fn node(&self, name: &str) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_is_healthy_with_zero_counters() {
        let node = Node::new("a", "http://a:80", NodeRole::Primary, "a.service");
        assert_eq!(node.state(), NodeState::Healthy);
        assert_eq!(node.failure_count(), 0);
        assert_eq!(node.restart_count(), 0);
        assert!(!node.is_escalated());
        assert!(node.last_restart_at().is_none());
    }

    #[test]
    fn test_from_config_defaults_unit_to_name() {
        let config = NodeConfig {
            name: "backup".to_string(),
            address: "http://b:80".to_string(),
            role: NodeRole::Backup,
            unit: None,
        };
        let node = Node::from_config(&config);
        assert_eq!(node.unit(), "backup");
        assert_eq!(node.role(), NodeRole::Backup);
    }

    #[test]
    fn test_state_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&NodeState::Restarting).unwrap(),
            "\"restarting\""
        );
        assert_eq!(NodeState::Crashed.to_string(), "crashed");
    }

    #[test]
    fn test_restartable_states() {
        assert!(NodeState::Unhealthy.is_restartable());
        assert!(NodeState::Crashed.is_restartable());
        assert!(!NodeState::Healthy.is_restartable());
        assert!(!NodeState::Restarting.is_restartable());
    }
}
