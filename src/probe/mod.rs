//! Node health probing.
//!
//! A probe is a single reachability check against one node. Probing never
//! mutates shared state: the result is handed back to the scheduler, which
//! drives it through the rest of the per-node pipeline.

mod error;

pub use error::ProbeError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Raw answer from a [`HealthCheckPort`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub reachable: bool,
    pub latency_ms: u64,
    /// Definitive down-signal (connection refused, process absent) as
    /// opposed to a timeout or slow/erroring response.
    pub hard_failure: bool,
    /// Human-readable failure reason, for logs only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeOutcome {
    pub fn reachable(latency_ms: u64) -> Self {
        Self {
            reachable: true,
            latency_ms,
            hard_failure: false,
            error: None,
        }
    }

    pub fn failed(latency_ms: u64, error: &ProbeError) -> Self {
        Self {
            reachable: false,
            latency_ms,
            hard_failure: error.is_hard(),
            error: Some(error.to_string()),
        }
    }
}

/// Health-check interface, callable per node.
///
/// Implementations must honour `timeout`; [`HealthProbe`] also enforces it
/// from the outside so a misbehaving port cannot stall a tick.
#[async_trait]
pub trait HealthCheckPort: Send + Sync + 'static {
    async fn check(&self, address: &str, timeout: Duration) -> ProbeOutcome;
}

/// HTTP implementation: `GET {address}{health_path}`, 2xx means healthy.
pub struct HttpHealthCheck {
    client: reqwest::Client,
    health_path: String,
}

impl HttpHealthCheck {
    pub fn new(health_path: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, health_path))
    }

    /// Create a health check with custom HTTP client (for testing).
    pub fn with_client(client: reqwest::Client, health_path: impl Into<String>) -> Self {
        Self {
            client,
            health_path: health_path.into(),
        }
    }

    fn url_for(&self, address: &str) -> String {
        format!("{}{}", address.trim_end_matches('/'), self.health_path)
    }
}

#[async_trait]
impl HealthCheckPort for HttpHealthCheck {
    async fn check(&self, address: &str, timeout: Duration) -> ProbeOutcome {
        let start = Instant::now();
        let timeout_ms = timeout.as_millis() as u64;

        let result = self
            .client
            .get(self.url_for(address))
            .timeout(timeout)
            .send()
            .await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(response) if response.status().is_success() => ProbeOutcome::reachable(latency_ms),
            Ok(response) => ProbeOutcome::failed(
                latency_ms,
                &ProbeError::HttpStatus(response.status().as_u16()),
            ),
            Err(e) => ProbeOutcome::failed(latency_ms, &ProbeError::from_reqwest(&e, timeout_ms)),
        }
    }
}

/// Collapsed probe verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeVerdict {
    Healthy,
    Unreachable,
}

/// What the rest of the pipeline sees from one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub verdict: ProbeVerdict,
    pub latency_ms: u64,
    pub hard_failure: bool,
    pub error: Option<String>,
}

impl ProbeResult {
    pub fn healthy(latency_ms: u64) -> Self {
        Self {
            verdict: ProbeVerdict::Healthy,
            latency_ms,
            hard_failure: false,
            error: None,
        }
    }

    /// Timeout-class failure
    pub fn soft_failure(latency_ms: u64) -> Self {
        Self {
            verdict: ProbeVerdict::Unreachable,
            latency_ms,
            hard_failure: false,
            error: None,
        }
    }

    /// Definitive down-signal
    pub fn hard_failure(latency_ms: u64) -> Self {
        Self {
            verdict: ProbeVerdict::Unreachable,
            latency_ms,
            hard_failure: true,
            error: None,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.verdict == ProbeVerdict::Healthy
    }
}

impl From<ProbeOutcome> for ProbeResult {
    fn from(outcome: ProbeOutcome) -> Self {
        Self {
            verdict: if outcome.reachable {
                ProbeVerdict::Healthy
            } else {
                ProbeVerdict::Unreachable
            },
            latency_ms: outcome.latency_ms,
            // A reachable node never carries a down-signal
            hard_failure: !outcome.reachable && outcome.hard_failure,
            error: outcome.error,
        }
    }
}

/// Stateless prober bound to a port and a timeout.
#[derive(Clone)]
pub struct HealthProbe {
    port: std::sync::Arc<dyn HealthCheckPort>,
    timeout: Duration,
}

impl HealthProbe {
    pub fn new(port: std::sync::Arc<dyn HealthCheckPort>, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    /// Perform one reachability check against `address`.
    pub async fn probe(&self, address: &str) -> ProbeResult {
        let start = Instant::now();
        match tokio::time::timeout(self.timeout, self.port.check(address, self.timeout)).await {
            Ok(outcome) => {
                let result = ProbeResult::from(outcome);
                metrics::histogram!("guardian_probe_latency_seconds",
                    "address" => address.to_string()
                )
                .record(result.latency_ms as f64 / 1000.0);
                result
            }
            Err(_) => {
                let error = ProbeError::Timeout(self.timeout.as_millis() as u64);
                ProbeResult {
                    error: Some(error.to_string()),
                    ..ProbeResult::soft_failure(start.elapsed().as_millis() as u64)
                }
            }
        }
    }
}
