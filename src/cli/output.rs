//! Output formatting helpers for CLI commands

use crate::alerts::AlertRecord;
use crate::fleet::{FleetSnapshot, NodeSnapshot, NodeState};
use crate::probe::ProbeResult;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;
use serde_json::json;
use std::fmt::Write;

/// One row of `guardian check` output.
#[derive(Debug, Clone, Serialize)]
pub struct CheckView {
    pub name: String,
    pub address: String,
    pub healthy: bool,
    pub hard_failure: bool,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckView {
    pub fn new(name: impl Into<String>, address: impl Into<String>, result: &ProbeResult) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            healthy: result.is_healthy(),
            hard_failure: result.hard_failure,
            latency_ms: result.latency_ms,
            error: result.error.clone(),
        }
    }
}

/// Colored state label
pub fn state_label(state: NodeState) -> String {
    match state {
        NodeState::Healthy => "Healthy".green().to_string(),
        NodeState::Unhealthy => "Unhealthy".yellow().to_string(),
        NodeState::Crashed => "Crashed".red().bold().to_string(),
        NodeState::Restarting => "Restarting".cyan().to_string(),
    }
}

/// Get status icon for a node state
pub fn state_icon(state: NodeState) -> &'static str {
    match state {
        NodeState::Healthy => "✓",
        NodeState::Unhealthy => "!",
        NodeState::Crashed => "✗",
        NodeState::Restarting => "~",
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

fn node_row(n: &NodeSnapshot) -> Vec<Cell> {
    let restarts = if n.escalated {
        format!("{} (escalated)", n.restart_count).red().to_string()
    } else {
        n.restart_count.to_string()
    };
    vec![
        Cell::new(format!("{} {}", state_icon(n.state), n.name)),
        Cell::new(&n.address),
        Cell::new(format!("{:?}", n.role).to_lowercase()),
        Cell::new(state_label(n.state)),
        Cell::new(n.failure_count),
        Cell::new(restarts),
        Cell::new(
            n.last_latency_ms
                .map(|ms| format!("{}ms", ms))
                .unwrap_or_else(|| "-".to_string()),
        ),
    ]
}

/// Format a fleet snapshot as a summary line plus a node table
pub fn format_snapshot_table(snapshot: &FleetSnapshot) -> String {
    let mut output = String::new();

    let mode = if snapshot.guardian_active {
        "active".green()
    } else {
        "paused".yellow()
    };
    let _ = writeln!(
        output,
        "Guardian: {}  Healthy: {}/{}  Crashed: {}  Floor: {}",
        mode,
        snapshot.count(NodeState::Healthy),
        snapshot.nodes.len(),
        snapshot.count(NodeState::Crashed),
        snapshot.availability_floor
    );

    let mut table = new_table(vec![
        "Node", "Address", "Role", "State", "Failures", "Restarts", "Latency",
    ]);
    for n in &snapshot.nodes {
        table.add_row(node_row(n));
    }
    let _ = write!(output, "{}", table);

    output
}

/// Format a fleet snapshot as JSON
pub fn format_snapshot_json(snapshot: &FleetSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snapshot)
}

/// Format one-off probe results as a table
pub fn format_check_table(checks: &[CheckView]) -> String {
    let mut table = new_table(vec!["Node", "Address", "Result", "Latency", "Detail"]);

    for c in checks {
        let result = match (c.healthy, c.hard_failure) {
            (true, _) => "reachable".green().to_string(),
            (false, true) => "down".red().to_string(),
            (false, false) => "unreachable".yellow().to_string(),
        };
        table.add_row(vec![
            Cell::new(&c.name),
            Cell::new(&c.address),
            Cell::new(result),
            Cell::new(format!("{}ms", c.latency_ms)),
            Cell::new(c.error.as_deref().unwrap_or("")),
        ]);
    }

    table.to_string()
}

/// Format one-off probe results as JSON
pub fn format_check_json(checks: &[CheckView]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({ "nodes": checks }))
}

/// Format recent alerts, one per line, newest last
pub fn format_alerts(alerts: &[AlertRecord]) -> String {
    let mut output = String::new();
    for a in alerts {
        let _ = writeln!(
            output,
            "{} {} {} {}",
            a.raised_at.format("%Y-%m-%d %H:%M:%S"),
            "ALERT".red().bold(),
            a.event.kind(),
            a.event.node()
        );
    }
    output
}
