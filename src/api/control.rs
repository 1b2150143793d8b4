//! Operator command handlers.

use crate::api::{ApiError, AppState};
use crate::fleet::NodeSnapshot;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct ControlResponse {
    pub guardian_active: bool,
    /// Whether the call changed anything
    pub changed: bool,
}

/// POST /control/pause - Suspend crash marking and restarts; probing and
/// reporting continue.
pub async fn pause(State(state): State<Arc<AppState>>) -> Json<ControlResponse> {
    let previous = state.runtime.set_active(false);
    Json(ControlResponse {
        guardian_active: false,
        changed: previous,
    })
}

/// POST /control/resume - Re-enable automated actions.
pub async fn resume(State(state): State<Arc<AppState>>) -> Json<ControlResponse> {
    let previous = state.runtime.set_active(true);
    Json(ControlResponse {
        guardian_active: true,
        changed: !previous,
    })
}

/// POST /nodes/:name/reset - Clear a node's restart budget and escalation.
pub async fn reset(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<NodeSnapshot>, ApiError> {
    Ok(Json(state.runtime.reset_restart_budget(&name)?))
}
