//! Liveness endpoint handler.

use crate::api::AppState;
use crate::fleet::NodeState;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy", "degraded" (some node not Healthy) or "critical" (a node
    /// is Crashed)
    pub status: String,
    pub guardian_active: bool,
    pub uptime_seconds: u64,
    pub nodes: NodeCounts,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NodeCounts {
    pub total: usize,
    pub healthy: usize,
    pub unhealthy: usize,
    pub crashed: usize,
    pub restarting: usize,
}

/// GET /health - 200 unless some node is Crashed, then 503.
pub async fn handle(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let snapshot = state.runtime.snapshot();
    let nodes = NodeCounts {
        total: snapshot.nodes.len(),
        healthy: snapshot.count(NodeState::Healthy),
        unhealthy: snapshot.count(NodeState::Unhealthy),
        crashed: snapshot.count(NodeState::Crashed),
        restarting: snapshot.count(NodeState::Restarting),
    };

    let (code, status) = match (nodes.crashed, nodes.healthy == nodes.total) {
        (0, true) => (StatusCode::OK, "healthy"),
        (0, false) => (StatusCode::OK, "degraded"),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "critical"),
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            guardian_active: snapshot.guardian_active,
            uptime_seconds: state.start_time.elapsed().as_secs(),
            nodes,
        }),
    )
}
