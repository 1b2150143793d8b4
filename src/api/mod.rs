//! # Status and control API
//!
//! Small HTTP surface over a running guardian.
//!
//! ## Endpoints
//!
//! - `GET /health` - Fleet summary; 503 while any node is Crashed
//! - `GET /status` - Full fleet snapshot
//! - `GET /alerts` - Recent alerts
//! - `GET /metrics` - Prometheus metrics
//! - `POST /control/pause` - Suspend automated actions
//! - `POST /control/resume` - Resume automated actions
//! - `POST /nodes/:name/reset` - Reset a node's restart budget
//!
//! ## Example
//!
//! ```no_run
//! use guardian::api::{create_router, AppState};
//! use guardian::config::GuardianConfig;
//! use guardian::fleet::GuardianRuntime;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GuardianConfig::load(Some(std::path::Path::new("guardian.toml")))?;
//! let runtime = Arc::new(GuardianRuntime::new(&config));
//! let app = create_router(Arc::new(AppState::new(runtime)));
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:9400").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

mod control;
mod error;
mod health;
mod status;

pub use control::ControlResponse;
pub use error::{ApiError, ApiErrorBody, ApiErrorResponse};
pub use health::{HealthResponse, NodeCounts};
pub use status::AlertsResponse;

use crate::fleet::GuardianRuntime;
use crate::metrics::PrometheusHandle;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Shared state for all handlers.
pub struct AppState {
    pub runtime: Arc<GuardianRuntime>,
    /// Startup time for uptime tracking
    pub start_time: Instant,
    pub prometheus: PrometheusHandle,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(runtime: Arc<GuardianRuntime>) -> Self {
        Self {
            runtime,
            start_time: Instant::now(),
            prometheus: crate::metrics::handle_or_detached(),
            request_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Create the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let timeout = state.request_timeout;
    Router::new()
        .route("/health", get(health::handle))
        .route("/status", get(status::handle))
        .route("/alerts", get(status::alerts))
        .route("/metrics", get(status::metrics))
        .route("/control/pause", post(control::pause))
        .route("/control/resume", post(control::resume))
        .route("/nodes/:name/reset", post(control::reset))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .with_state(state)
}
