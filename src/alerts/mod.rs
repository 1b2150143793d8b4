//! Discrete alert events.
//!
//! Alerts are the guardian's way of asking for a human: they are logged at
//! `warn`, counted in metrics, kept in a short history and broadcast to any
//! subscriber (the control API, tests).

mod history;

pub use history::{AlertHistory, DEFAULT_CAPACITY};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Something an operator should know about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertEvent {
    /// FleetGuard refused a Crashed transition; retried next tick
    CrashDenied {
        node: String,
        crashed: usize,
        fleet_size: usize,
        availability_floor: usize,
    },
    /// Restart budget used up; standing until the operator resets it
    RestartBudgetExhausted { node: String, restart_count: u32 },
    /// A restart was not confirmed by a healthy probe in time
    RestartConfirmationTimeout { node: String, waited_seconds: u64 },
    /// The supervisor did not accept the restart command
    RestartRejected { node: String, reason: String },
}

impl AlertEvent {
    pub fn node(&self) -> &str {
        match self {
            AlertEvent::CrashDenied { node, .. }
            | AlertEvent::RestartBudgetExhausted { node, .. }
            | AlertEvent::RestartConfirmationTimeout { node, .. }
            | AlertEvent::RestartRejected { node, .. } => node,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AlertEvent::CrashDenied { .. } => "crash_denied",
            AlertEvent::RestartBudgetExhausted { .. } => "restart_budget_exhausted",
            AlertEvent::RestartConfirmationTimeout { .. } => "restart_confirmation_timeout",
            AlertEvent::RestartRejected { .. } => "restart_rejected",
        }
    }
}

/// An alert with the time it was raised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub raised_at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: AlertEvent,
}

/// Fan-out point for alerts.
pub struct AlertSink {
    sender: broadcast::Sender<AlertEvent>,
    history: AlertHistory,
}

impl AlertSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            history: AlertHistory::with_capacity(capacity),
        }
    }

    /// Log, count, record and broadcast an alert.
    pub fn emit(&self, event: AlertEvent) {
        tracing::warn!(
            node = event.node(),
            kind = event.kind(),
            alert = ?event,
            "Guardian alert"
        );
        metrics::counter!("guardian_alerts_total", "kind" => event.kind()).increment(1);

        self.history.push(AlertRecord {
            raised_at: Utc::now(),
            event: event.clone(),
        });
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.sender.subscribe()
    }

    pub fn recent(&self) -> Vec<AlertRecord> {
        self.history.get_all()
    }
}

impl Default for AlertSink {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_serializes_with_kind_tag() {
        let event = AlertEvent::CrashDenied {
            node: "backup".to_string(),
            crashed: 1,
            fleet_size: 2,
            availability_floor: 1,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "crash_denied");
        assert_eq!(json["node"], "backup");
        assert_eq!(event.kind(), "crash_denied");
    }

    #[tokio::test]
    async fn test_sink_broadcasts_and_records() {
        let sink = AlertSink::default();
        let mut rx = sink.subscribe();

        sink.emit(AlertEvent::RestartRejected {
            node: "primary".to_string(),
            reason: "exit status 5".to_string(),
        });

        let received = rx.recv().await.unwrap();
        assert_eq!(received.node(), "primary");
        assert_eq!(sink.recent().len(), 1);
    }

    #[test]
    fn test_sink_emit_without_subscribers() {
        let sink = AlertSink::default();
        sink.emit(AlertEvent::RestartConfirmationTimeout {
            node: "primary".to_string(),
            waited_seconds: 120,
        });
        assert_eq!(sink.recent()[0].event.kind(), "restart_confirmation_timeout");
    }
}
