//! Control API server configuration

use serde::{Deserialize, Serialize};

/// Status/control HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 9400,
            request_timeout_seconds: 10,
        }
    }
}

impl ServerConfig {
    /// Base URL a local CLI uses to reach the running daemon.
    pub fn base_url(&self) -> String {
        let host = if self.host == "0.0.0.0" {
            "127.0.0.1"
        } else {
            self.host.as_str()
        };
        format!("http://{}:{}", host, self.port)
    }
}
