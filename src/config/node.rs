//! Monitored node configuration

use serde::{Deserialize, Serialize};

/// Role of a node within the fleet. Informational only: the guardian never
/// shifts traffic between roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    #[default]
    Primary,
    Backup,
}

/// One statically configured node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub name: String,
    /// Base URL of the node's API service, e.g. `http://10.0.0.10:8080`
    pub address: String,
    #[serde(default)]
    pub role: NodeRole,
    /// Supervisor unit name substituted for `{unit}` in the restart command.
    /// Defaults to the node name.
    #[serde(default)]
    pub unit: Option<String>,
}

impl NodeConfig {
    pub fn unit(&self) -> &str {
        self.unit.as_deref().unwrap_or(&self.name)
    }
}
