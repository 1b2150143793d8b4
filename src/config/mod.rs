//! Configuration module for the guardian
//!
//! Configuration is read once at startup and is immutable afterwards.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`GUARDIAN_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use guardian::config::GuardianConfig;
//!
//! let toml = r#"
//! [guardian]
//! max_failures = 4
//!
//! [[nodes]]
//! name = "primary"
//! address = "http://10.0.0.10:8080"
//! "#;
//! let config: GuardianConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.guardian.max_failures, 4);
//! assert!(config.validate().is_ok());
//! ```

pub mod error;
pub mod guardian;
pub mod logging;
pub mod node;
pub mod restart;
pub mod server;
pub mod status;

pub use error::ConfigError;
pub use guardian::GuardianSettings;
pub use logging::{LogFormat, LoggingConfig};
pub use node::{NodeConfig, NodeRole};
pub use restart::RestartConfig;
pub use server::ServerConfig;
pub use status::StatusConfig;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Annotated example configuration, written by `guardian config init`.
pub const EXAMPLE_CONFIG: &str = include_str!("../../guardian.example.toml");

/// Unified guardian configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GuardianConfig {
    /// Thresholds, budgets and cadence
    pub guardian: GuardianSettings,
    /// Restart command template
    pub restart: RestartConfig,
    /// Status/control API
    pub server: ServerConfig,
    /// Snapshot persistence
    pub status: StatusConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// The fixed node set
    pub nodes: Vec<NodeConfig>,
}

impl GuardianConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are silently ignored (file or default values are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = std::env::var("GUARDIAN_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("GUARDIAN_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }
        if let Ok(interval) = std::env::var("GUARDIAN_INTERVAL") {
            if let Ok(secs) = interval.parse() {
                self.guardian.interval_seconds = secs;
            }
        }
        if let Ok(port) = std::env::var("GUARDIAN_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("GUARDIAN_HOST") {
            self.server.host = host;
        }

        self
    }

    /// Validate configuration.
    ///
    /// A guardian with an unusable node list or budgets must not start.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.guardian;

        if self.nodes.is_empty() {
            return Err(ConfigError::invalid("nodes", "at least one node is required"));
        }
        if g.interval_seconds == 0 {
            return Err(ConfigError::invalid(
                "guardian.interval_seconds",
                "must be at least 1",
            ));
        }
        if g.probe_timeout_seconds == 0 {
            return Err(ConfigError::invalid(
                "guardian.probe_timeout_seconds",
                "must be at least 1",
            ));
        }
        if g.max_failures == 0 {
            return Err(ConfigError::invalid(
                "guardian.max_failures",
                "must be at least 1",
            ));
        }
        if g.availability_floor == 0 || g.availability_floor > self.nodes.len() {
            return Err(ConfigError::invalid(
                "guardian.availability_floor",
                format!("must be between 1 and the node count ({})", self.nodes.len()),
            ));
        }
        if self.restart.command.is_empty() || self.restart.command[0].trim().is_empty() {
            return Err(ConfigError::invalid(
                "restart.command",
                "command cannot be empty",
            ));
        }

        let mut seen = HashSet::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if node.name.is_empty() {
                return Err(ConfigError::invalid(
                    format!("nodes[{}].name", i),
                    "name cannot be empty",
                ));
            }
            if !seen.insert(node.name.as_str()) {
                return Err(ConfigError::DuplicateNode(node.name.clone()));
            }
            match reqwest::Url::parse(&node.address) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => {
                    return Err(ConfigError::invalid(
                        format!("nodes[{}].address", i),
                        format!("unsupported scheme '{}'", url.scheme()),
                    ))
                }
                Err(e) => {
                    return Err(ConfigError::invalid(
                        format!("nodes[{}].address", i),
                        e.to_string(),
                    ))
                }
            }
        }

        Ok(())
    }
}
