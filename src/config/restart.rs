//! Restart command configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the guardian asks a node's process supervisor to restart it.
///
/// Each element of `command` may contain the placeholders `{node}`, `{unit}`
/// and `{address}`, substituted per node before execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartConfig {
    pub command: Vec<String>,
    /// Upper bound on how long issuing the command may take
    pub command_timeout_seconds: u64,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "systemctl".to_string(),
                "restart".to_string(),
                "--no-block".to_string(),
                "{unit}".to_string(),
            ],
            command_timeout_seconds: 15,
        }
    }
}

impl RestartConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_seconds)
    }
}
