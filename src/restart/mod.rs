//! Restart interface and fire-and-forget dispatch.
//!
//! A restart is only ever *issued* here. Acceptance means the process
//! supervisor took the command; whether the service came back is decided
//! by a later probe.

mod error;

pub use error::RestartError;

use crate::alerts::{AlertEvent, AlertSink};
use crate::config::RestartConfig;
use crate::fleet::RestartOrder;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::task::TaskTracker;

/// Supervisor's answer to a restart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartAck {
    pub accepted: bool,
    pub detail: Option<String>,
}

impl RestartAck {
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            detail: None,
        }
    }

    pub fn rejected(detail: impl Into<String>) -> Self {
        Self {
            accepted: false,
            detail: Some(detail.into()),
        }
    }
}

impl From<Result<(), RestartError>> for RestartAck {
    fn from(result: Result<(), RestartError>) -> Self {
        match result {
            Ok(()) => RestartAck::accepted(),
            Err(e) => RestartAck::rejected(e.to_string()),
        }
    }
}

/// Restart interface, invocable per node.
#[async_trait]
pub trait RestartPort: Send + Sync + 'static {
    async fn restart(&self, order: &RestartOrder) -> RestartAck;
}

/// Runs a configured supervisor command, e.g.
/// `systemctl restart --no-block {unit}`.
pub struct CommandRestarter {
    template: Vec<String>,
    timeout: Duration,
}

impl CommandRestarter {
    pub fn new(config: &RestartConfig) -> Self {
        Self {
            template: config.command.clone(),
            timeout: config.command_timeout(),
        }
    }

    /// Substitute `{node}`, `{unit}` and `{address}` in every argument.
    pub fn render(&self, order: &RestartOrder) -> Vec<String> {
        self.template
            .iter()
            .map(|arg| {
                arg.replace("{node}", &order.node)
                    .replace("{unit}", &order.unit)
                    .replace("{address}", &order.address)
            })
            .collect()
    }

    async fn run(&self, order: &RestartOrder) -> Result<(), RestartError> {
        let argv = self.render(order);
        let (program, args) = argv.split_first().ok_or(RestartError::EmptyCommand)?;

        tracing::debug!(node = %order.node, command = ?argv, "Running restart command");

        let mut cmd = Command::new(program);
        cmd.args(args).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| RestartError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| RestartError::Spawn {
                program: program.clone(),
                message: e.to_string(),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(RestartError::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[async_trait]
impl RestartPort for CommandRestarter {
    async fn restart(&self, order: &RestartOrder) -> RestartAck {
        self.run(order).await.into()
    }
}

/// Issues restarts on background tasks so a tick never waits on a
/// supervisor. In-flight commands are tracked for shutdown.
#[derive(Clone)]
pub struct RestartDispatcher {
    port: Arc<dyn RestartPort>,
    alerts: Arc<AlertSink>,
    tracker: TaskTracker,
}

impl RestartDispatcher {
    pub fn new(port: Arc<dyn RestartPort>, alerts: Arc<AlertSink>) -> Self {
        Self {
            port,
            alerts,
            tracker: TaskTracker::new(),
        }
    }

    /// Fire and forget. A rejection is logged and alerted but never retried
    /// or re-counted: the node stays Restarting until confirmed or timed out.
    pub fn dispatch(&self, order: RestartOrder) {
        let port = Arc::clone(&self.port);
        let alerts = Arc::clone(&self.alerts);

        self.tracker.spawn(async move {
            let ack = port.restart(&order).await;
            if ack.accepted {
                tracing::info!(node = %order.node, attempt = order.attempt, "Restart accepted by supervisor");
            } else {
                alerts.emit(AlertEvent::RestartRejected {
                    node: order.node.clone(),
                    reason: ack.detail.unwrap_or_else(|| "rejected".to_string()),
                });
            }
        });
    }

    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait for every in-flight restart command to return.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Shutdown: give in-flight commands up to `grace` to finish. Returns
    /// false if some were still running.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.tracker.close();
        let finished = tokio::time::timeout(grace, self.tracker.wait())
            .await
            .is_ok();
        if !finished {
            tracing::warn!(
                in_flight = self.tracker.len(),
                "Restart commands still running at shutdown"
            );
        }
        finished
    }
}
