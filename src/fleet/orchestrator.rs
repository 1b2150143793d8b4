//! Restart decisions and the per-node restart budget.

use super::node::{Node, NodeState};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A restart the scheduler must hand to the restart port once the fleet
/// lock is released.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestartOrder {
    pub node: String,
    pub unit: String,
    pub address: String,
    /// 1-based attempt number within the current budget
    pub attempt: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartDecision {
    /// Budget available: node moved to Restarting, command to be issued
    Restarted(RestartOrder),
    /// Budget used up; `newly_escalated` is true on the tick that raised
    /// the standing escalation
    BudgetExhausted { newly_escalated: bool },
    NotEligible,
}

/// Enforces `MaxFailures` eligibility and the `MaxRestarts` budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartOrchestrator {
    max_failures: u32,
    max_restarts: u32,
}

impl RestartOrchestrator {
    pub fn new(max_failures: u32, max_restarts: u32) -> Self {
        Self {
            max_failures,
            max_restarts,
        }
    }

    pub fn max_restarts(&self) -> u32 {
        self.max_restarts
    }

    pub fn is_eligible(&self, node: &Node) -> bool {
        node.failure_count >= self.max_failures && node.state.is_restartable()
    }

    /// Decide, and on `Restarted` apply the Restarting transition.
    ///
    /// Once the budget is exhausted the restart port is never called again
    /// for this node until [`reset_budget`](Self::reset_budget).
    pub fn maybe_restart(&self, node: &mut Node, now: DateTime<Utc>) -> RestartDecision {
        if !self.is_eligible(node) {
            return RestartDecision::NotEligible;
        }

        if node.restart_count >= self.max_restarts {
            let newly_escalated = !node.escalated;
            node.escalated = true;
            return RestartDecision::BudgetExhausted { newly_escalated };
        }

        node.restart_count += 1;
        node.failure_count = 0;
        node.state = NodeState::Restarting;
        node.last_restart_at = Some(now);

        RestartDecision::Restarted(RestartOrder {
            node: node.name().to_string(),
            unit: node.unit().to_string(),
            address: node.address().to_string(),
            attempt: node.restart_count,
        })
    }

    /// Operator action: clear the restart count and any standing escalation.
    pub fn reset_budget(&self, node: &mut Node) {
        node.restart_count = 0;
        node.escalated = false;
    }
}
