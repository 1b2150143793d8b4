//! Integration tests for the status and control API.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use common::{make_runtime, two_node_settings};
use guardian::api::{create_router, AlertsResponse, AppState, ControlResponse, HealthResponse};
use guardian::fleet::{FleetSnapshot, GuardianRuntime, NodeSnapshot, NodeState};
use guardian::probe::ProbeResult;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower::Service;

fn create_test_app() -> (axum::Router, Arc<GuardianRuntime>) {
    let runtime = make_runtime(&["primary", "backup"], &two_node_settings());
    let state = Arc::new(AppState::new(Arc::clone(&runtime)));
    (create_router(state), runtime)
}

async fn send(app: &mut axum::Router, method: &str, uri: &str) -> axum::response::Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.call(request).await.unwrap()
}

async fn json<T: DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn exhaust_budget(runtime: &GuardianRuntime, node: &str) {
    let now = Utc::now();
    for _ in 0..2 {
        for _ in 0..3 {
            runtime.apply_probe(node, &ProbeResult::soft_failure(1), now);
        }
        runtime.apply_probe(node, &ProbeResult::healthy(1), now);
    }
    for _ in 0..3 {
        runtime.apply_probe(node, &ProbeResult::soft_failure(1), now);
    }
}

#[tokio::test]
async fn test_health_ok_when_fleet_healthy() {
    let (mut app, _) = create_test_app();

    let response = send(&mut app, "GET", "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: HealthResponse = json(response).await;
    assert_eq!(body.status, "healthy");
    assert_eq!(body.nodes.total, 2);
    assert_eq!(body.nodes.healthy, 2);
    assert!(body.guardian_active);
}

#[tokio::test]
async fn test_health_degraded_still_ok() {
    let (mut app, runtime) = create_test_app();
    runtime.apply_probe("backup", &ProbeResult::soft_failure(1), Utc::now());

    let response = send(&mut app, "GET", "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: HealthResponse = json(response).await;
    assert_eq!(body.status, "degraded");
    assert_eq!(body.nodes.unhealthy, 1);
}

#[tokio::test]
async fn test_health_503_when_node_crashed() {
    let (mut app, runtime) = create_test_app();
    runtime.apply_probe("backup", &ProbeResult::hard_failure(1), Utc::now());

    let response = send(&mut app, "GET", "/health").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: HealthResponse = json(response).await;
    assert_eq!(body.status, "critical");
    assert_eq!(body.nodes.crashed, 1);
}

#[tokio::test]
async fn test_status_returns_snapshot() {
    let (mut app, runtime) = create_test_app();
    runtime.apply_probe("primary", &ProbeResult::healthy(7), Utc::now());

    let response = send(&mut app, "GET", "/status").await;
    assert_eq!(response.status(), StatusCode::OK);

    let snapshot: FleetSnapshot = json(response).await;
    assert_eq!(snapshot.nodes.len(), 2);
    assert_eq!(snapshot.availability_floor, 1);
    let primary = snapshot.node("primary").unwrap();
    assert_eq!(primary.last_latency_ms, Some(7));
    assert!(primary.last_probe_at.is_some());
}

#[tokio::test]
async fn test_pause_and_resume() {
    let (mut app, runtime) = create_test_app();

    let response = send(&mut app, "POST", "/control/pause").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: ControlResponse = json(response).await;
    assert!(!body.guardian_active);
    assert!(body.changed);
    assert!(!runtime.is_active());

    let body: ControlResponse = json(send(&mut app, "POST", "/control/pause").await).await;
    assert!(!body.changed);

    let body: ControlResponse = json(send(&mut app, "POST", "/control/resume").await).await;
    assert!(body.guardian_active);
    assert!(body.changed);
    assert!(runtime.is_active());
}

#[tokio::test]
async fn test_pause_requires_post() {
    let (mut app, _) = create_test_app();
    let response = send(&mut app, "GET", "/control/pause").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_reset_clears_escalation() {
    let (mut app, runtime) = create_test_app();
    exhaust_budget(&runtime, "backup");
    assert!(runtime.node("backup").unwrap().escalated);

    let response = send(&mut app, "POST", "/nodes/backup/reset").await;
    assert_eq!(response.status(), StatusCode::OK);

    let node: NodeSnapshot = json(response).await;
    assert_eq!(node.name, "backup");
    assert_eq!(node.restart_count, 0);
    assert!(!node.escalated);
    assert_eq!(node.state, NodeState::Unhealthy);
}

#[tokio::test]
async fn test_reset_unknown_node_is_404() {
    let (mut app, _) = create_test_app();

    let response = send(&mut app, "POST", "/nodes/ghost/reset").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: serde_json::Value = json(response).await;
    assert_eq!(body["error"]["code"], "not_found");
    assert!(body["error"]["message"].as_str().unwrap().contains("ghost"));
}

#[tokio::test]
async fn test_alerts_lists_recent_events() {
    let (mut app, runtime) = create_test_app();
    exhaust_budget(&runtime, "primary");

    let body: AlertsResponse = json(send(&mut app, "GET", "/alerts").await).await;
    assert_eq!(body.alerts.len(), 1);
    assert_eq!(body.alerts[0].event.kind(), "restart_budget_exhausted");
    assert_eq!(body.alerts[0].event.node(), "primary");
}

#[tokio::test]
async fn test_metrics_endpoint_is_prometheus_text() {
    let (mut app, _) = create_test_app();

    let response = send(&mut app, "GET", "/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (mut app, _) = create_test_app();
    let response = send(&mut app, "GET", "/v1/models").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
