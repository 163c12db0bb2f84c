//! Gateway-generated responses.
//!
//! # Responsibilities
//! - Health check body
//! - JSON error bodies for routing and forwarding failures
//! - Map internal errors to HTTP status codes
//!
//! # Design Decisions
//! - Backend responses are streamed through untouched; only responses the
//!   gateway produces itself are built here
//! - Error bodies never include backend URLs

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::http::forward::ForwardError;
use crate::routing::RouteError;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

impl HealthStatus {
    pub fn up() -> Self {
        Self { status: "UP" }
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error: String,
    pub message: String,
}

/// Build a JSON error response.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        status: status.as_u16(),
        error: status.canonical_reason().unwrap_or("Error").to_string(),
        message: message.into(),
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        match self {
            RouteError::NotFound { .. } => error_response(StatusCode::NOT_FOUND, self.to_string()),
            RouteError::MissingRouteConfiguration { .. } => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Gateway route configuration is incomplete",
            ),
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        match self {
            ForwardError::Timeout(_) => error_response(StatusCode::GATEWAY_TIMEOUT, "Upstream request timed out"),
            ForwardError::Upstream(_) | ForwardError::InvalidTarget { .. } => {
                error_response(StatusCode::BAD_GATEWAY, "Upstream request failed")
            }
        }
    }
}
