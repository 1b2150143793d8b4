//! Status, alert and metrics handlers.

use crate::alerts::AlertRecord;
use crate::api::AppState;
use crate::fleet::FleetSnapshot;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// GET /status - Current fleet snapshot.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<FleetSnapshot> {
    Json(state.runtime.snapshot())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AlertsResponse {
    pub alerts: Vec<AlertRecord>,
}

/// GET /alerts - Recent alerts, oldest first.
pub async fn alerts(State(state): State<Arc<AppState>>) -> Json<AlertsResponse> {
    Json(AlertsResponse {
        alerts: state.runtime.alerts().recent(),
    })
}

/// GET /metrics - Prometheus text format.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    crate::metrics::record_snapshot(&state.runtime.snapshot());
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        state.prometheus.render(),
    )
}
