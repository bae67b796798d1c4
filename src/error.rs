// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::flows::FlowError;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No session or no access token; raised before any upstream call.
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired session")]
    InvalidToken,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Field-level validation messages, already joined.
    #[error("{0}")]
    Validation(String),

    /// Non-2xx answer from the LearnHub API.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// A checkout step was attempted out of order or with bad input.
    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether the upstream rejected our credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            AppError::Unauthorized | AppError::InvalidToken | AppError::Upstream { status: 401, .. }
        )
    }

    /// Message suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Upstream { message, .. } => message.clone(),
            AppError::Validation(msg) | AppError::BadRequest(msg) => msg.clone(),
            AppError::Network(_) => "Network error, please try again".to_string(),
            AppError::Internal(_) => "Something went wrong".to_string(),
            other => other.to_string(),
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", Some(msg.clone())),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", Some(msg.clone()))
            }
            AppError::Flow(err) => (StatusCode::BAD_REQUEST, "flow_error", Some(err.to_string())),
            AppError::Upstream { status, message } => {
                let code = match *status {
                    400 | 401 | 403 | 404 | 409 | 422 => {
                        StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                    }
                    _ => StatusCode::BAD_GATEWAY,
                };
                if code == StatusCode::BAD_GATEWAY {
                    tracing::warn!(upstream_status = status, error = %message, "Upstream API error");
                }
                (code, "upstream_error", Some(message.clone()))
            }
            AppError::Network(msg) => {
                tracing::warn!(error = %msg, "Upstream network error");
                (StatusCode::BAD_GATEWAY, "network_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
