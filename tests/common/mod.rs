//! Shared test utilities for guardian integration tests.
//!
//! Builders for fleets and runtimes plus scripted stand-ins for the two
//! external collaborators (health checks and the process supervisor).

#![allow(dead_code)]

use async_trait::async_trait;
use guardian::config::{GuardianConfig, GuardianSettings, NodeConfig, NodeRole};
use guardian::fleet::{GuardianRuntime, Node, RestartOrder};
use guardian::probe::{HealthCheckPort, ProbeError, ProbeOutcome};
use guardian::restart::{RestartAck, RestartPort};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// Fleet Builders
// =============================================================================

/// Two-node fleet settings used throughout: MaxFailures=3, MaxRestarts=2,
/// availability floor 1.
pub fn two_node_settings() -> GuardianSettings {
    GuardianSettings {
        max_failures: 3,
        max_restarts: 2,
        availability_floor: 1,
        ..GuardianSettings::default()
    }
}

pub fn address_of(name: &str) -> String {
    format!("http://{}.internal:8080", name)
}

pub fn make_nodes(names: &[&str]) -> Vec<Node> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let role = if i == 0 {
                NodeRole::Primary
            } else {
                NodeRole::Backup
            };
            Node::new(*name, address_of(name), role, format!("{}.service", name))
        })
        .collect()
}

pub fn make_runtime(names: &[&str], settings: &GuardianSettings) -> Arc<GuardianRuntime> {
    Arc::new(GuardianRuntime::from_nodes(make_nodes(names), settings))
}

/// Config with one `[[nodes]]` entry per `(name, address)` pair.
pub fn make_config(nodes: &[(&str, &str)]) -> GuardianConfig {
    GuardianConfig {
        guardian: two_node_settings(),
        nodes: nodes
            .iter()
            .map(|(name, address)| NodeConfig {
                name: name.to_string(),
                address: address.to_string(),
                role: NodeRole::Primary,
                unit: None,
            })
            .collect(),
        ..GuardianConfig::default()
    }
}

// =============================================================================
// Scripted Collaborators
// =============================================================================

/// Health-check port answering from a per-address script. Unscripted
/// addresses are healthy.
#[derive(Default)]
pub struct ScriptedHealthCheck {
    outcomes: Mutex<HashMap<String, ProbeOutcome>>,
}

impl ScriptedHealthCheck {
    pub fn set(&self, address: &str, outcome: ProbeOutcome) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(address.to_string(), outcome);
    }

    pub fn healthy(&self, address: &str) {
        self.set(address, ProbeOutcome::reachable(2));
    }

    pub fn timeout(&self, address: &str) {
        self.set(address, ProbeOutcome::failed(5000, &ProbeError::Timeout(5000)));
    }

    pub fn refused(&self, address: &str) {
        self.set(
            address,
            ProbeOutcome::failed(1, &ProbeError::ConnectionRefused(address.to_string())),
        );
    }
}

#[async_trait]
impl HealthCheckPort for ScriptedHealthCheck {
    async fn check(&self, address: &str, _timeout: Duration) -> ProbeOutcome {
        self.outcomes
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .unwrap_or_else(|| ProbeOutcome::reachable(1))
    }
}

/// Restart port that records every order and accepts (or rejects) it.
pub struct RecordingRestarter {
    pub orders: Mutex<Vec<RestartOrder>>,
    accept: bool,
}

impl RecordingRestarter {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self {
            orders: Mutex::new(Vec::new()),
            accept: true,
        })
    }

    pub fn rejecting() -> Arc<Self> {
        Arc::new(Self {
            orders: Mutex::new(Vec::new()),
            accept: false,
        })
    }

    pub fn nodes(&self) -> Vec<String> {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .map(|o| o.node.clone())
            .collect()
    }
}

#[async_trait]
impl RestartPort for RecordingRestarter {
    async fn restart(&self, order: &RestartOrder) -> RestartAck {
        self.orders.lock().unwrap().push(order.clone());
        if self.accept {
            RestartAck::accepted()
        } else {
            RestartAck::rejected("supervisor refused")
        }
    }
}
