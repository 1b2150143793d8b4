//! Detection and recovery thresholds

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Core guardian settings: probe cadence, failure/restart budgets and the
/// fleet-wide availability floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardianSettings {
    /// Seconds between ticks
    pub interval_seconds: u64,
    /// Timeout for each probe request
    pub probe_timeout_seconds: u64,
    /// Consecutive failures that make a node eligible for restart
    pub max_failures: u32,
    /// Automatic restarts allowed per node before escalation
    pub max_restarts: u32,
    /// Minimum number of nodes that must stay out of `Crashed`
    pub availability_floor: usize,
    /// How long a restart may go unconfirmed before the node falls back
    /// into the failure cycle
    pub restart_confirmation_timeout_seconds: u64,
    /// Whether automated actions are enabled at startup
    pub start_active: bool,
    /// Path appended to each node address for the health probe
    pub health_path: String,
}

impl Default for GuardianSettings {
    fn default() -> Self {
        Self {
            interval_seconds: 30,
            probe_timeout_seconds: 5,
            max_failures: 3,
            max_restarts: 2,
            availability_floor: 1,
            restart_confirmation_timeout_seconds: 120,
            start_active: true,
            health_path: "/health".to_string(),
        }
    }
}

impl GuardianSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }

    pub fn restart_confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.restart_confirmation_timeout_seconds)
    }
}
