//! API error responses.

use crate::fleet::FleetError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// JSON error envelope: `{"error": {"message": ..., "code": ...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub code: String,
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
}

impl From<FleetError> for ApiError {
    fn from(e: FleetError) -> Self {
        match e {
            FleetError::UnknownNode(_) => ApiError::NotFound(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
        };
        let body = ApiErrorResponse {
            error: ApiErrorBody {
                message,
                code: code.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
