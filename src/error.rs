// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authorization exchange failed: {0}")]
    AuthorizationExchangeFailed(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Malformed credential record: {0}")]
    MalformedCredential(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Report query failed: {0}")]
    ReportUnavailable(String),

    #[error("YouTube API error: {0}")]
    YouTubeApi(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether this error means the caller must restart the OAuth flow.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            AppError::Unauthenticated
                | AppError::MalformedCredential(_)
                | AppError::AuthorizationExchangeFailed(_)
        )
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
            AppError::Configuration(msg) => {
                tracing::error!(error = %msg, "Configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "configuration_error",
                    None,
                )
            }
            AppError::AuthorizationExchangeFailed(msg) => {
                tracing::warn!(error = %msg, "Authorization exchange failed");
                (StatusCode::UNAUTHORIZED, "authorization_failed", None)
            }
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated", None),
            AppError::MalformedCredential(msg) => {
                tracing::warn!(error = %msg, "Malformed credential in session");
                (StatusCode::UNAUTHORIZED, "unauthenticated", None)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::ReportUnavailable(msg) => (
                StatusCode::BAD_GATEWAY,
                "report_unavailable",
                Some(msg.clone()),
            ),
            AppError::YouTubeApi(msg) => {
                (StatusCode::BAD_GATEWAY, "youtube_error", Some(msg.clone()))
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
