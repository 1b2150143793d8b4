//! Commands that talk to a running guardian over its API

use crate::api::{AlertsResponse, ApiErrorResponse, ControlResponse};
use crate::cli::output::{format_alerts, format_snapshot_json, format_snapshot_table};
use crate::cli::{RemoteArgs, ResetArgs};
use crate::config::GuardianConfig;
use crate::fleet::{FleetSnapshot, NodeSnapshot};
use colored::Colorize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Thin client for the guardian's status/control API.
pub struct GuardianClient {
    client: reqwest::Client,
    base_url: String,
}

impl GuardianClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Resolve the API address: `--url` wins, otherwise the config file's
    /// `[server]` section, otherwise the default.
    pub fn from_args(args: &RemoteArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let base_url = match &args.url {
            Some(url) => url.clone(),
            None => {
                let config = if args.config.exists() {
                    GuardianConfig::load(Some(&args.config))?
                } else {
                    GuardianConfig::default()
                };
                config.with_env_overrides().server.base_url()
            }
        };
        Ok(Self::new(base_url)?)
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, Box<dyn std::error::Error>> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let message = match response.json::<ApiErrorResponse>().await {
            Ok(body) => body.error.message,
            Err(_) => status.to_string(),
        };
        Err(message.into())
    }

    pub async fn status(&self) -> Result<FleetSnapshot, Box<dyn std::error::Error>> {
        let response = self
            .client
            .get(format!("{}/status", self.base_url))
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn alerts(&self) -> Result<AlertsResponse, Box<dyn std::error::Error>> {
        let response = self
            .client
            .get(format!("{}/alerts", self.base_url))
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn set_active(
        &self,
        active: bool,
    ) -> Result<ControlResponse, Box<dyn std::error::Error>> {
        let action = if active { "resume" } else { "pause" };
        let response = self
            .client
            .post(format!("{}/control/{}", self.base_url, action))
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn reset(&self, node: &str) -> Result<NodeSnapshot, Box<dyn std::error::Error>> {
        let response = self
            .client
            .post(format!("{}/nodes/{}/reset", self.base_url, node))
            .send()
            .await?;
        Self::decode(response).await
    }
}

/// Handle `guardian status`
pub async fn handle_status(args: &RemoteArgs) -> Result<String, Box<dyn std::error::Error>> {
    let client = GuardianClient::from_args(args)?;
    let snapshot = client.status().await?;

    if args.json {
        return Ok(format_snapshot_json(&snapshot)?);
    }

    let mut output = format_snapshot_table(&snapshot);
    let alerts = client.alerts().await?.alerts;
    if !alerts.is_empty() {
        output.push_str("\n\nRecent alerts:\n");
        output.push_str(&format_alerts(&alerts));
    }
    Ok(output)
}

/// Handle `guardian pause` / `guardian resume`
pub async fn handle_set_active(
    args: &RemoteArgs,
    active: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let response = GuardianClient::from_args(args)?.set_active(active).await?;

    if args.json {
        return Ok(serde_json::to_string_pretty(&response)?);
    }

    let state = if response.guardian_active {
        "active".green()
    } else {
        "paused".yellow()
    };
    Ok(if response.changed {
        format!("✓ Guardian is now {}", state)
    } else {
        format!("Guardian was already {}", state)
    })
}

/// Handle `guardian reset <node>`
pub async fn handle_reset(args: &ResetArgs) -> Result<String, Box<dyn std::error::Error>> {
    let node = GuardianClient::from_args(&args.remote)?
        .reset(&args.node)
        .await?;

    if args.remote.json {
        return Ok(serde_json::to_string_pretty(&node)?);
    }
    Ok(format!(
        "✓ Restart budget reset for {} (state: {})",
        node.name, node.state
    ))
}
