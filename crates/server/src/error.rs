//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::collections::BTreeMap;

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("metadata error: {0}")]
    Metadata(#[from] fonoteca_metadata::MetadataError),

    #[error("core error: {0}")]
    Core(#[from] fonoteca_core::Error),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal_error",
            Self::Metadata(_) => "metadata_error",
            Self::Core(_) => "bad_request",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Metadata(e) => match e {
                fonoteca_metadata::MetadataError::NotFound(_) => StatusCode::NOT_FOUND,
                fonoteca_metadata::MetadataError::AlreadyExists(_) => StatusCode::CONFLICT,
                fonoteca_metadata::MetadataError::Constraint(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Core(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// OAuth error response body, per RFC 6749 §5.2.
#[derive(Debug, Serialize)]
pub struct OAuthErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
    /// Per-field validation messages for `invalid_request` errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
}

/// Token endpoint error type. Distinct from [`ApiError`] because the
/// OAuth wire contract mandates its own body shape and codes.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("unsupported_grant_type")]
    UnsupportedGrantType,

    #[error("invalid_client")]
    InvalidClient,

    #[error("invalid_grant: {0}")]
    InvalidGrant(String),

    #[error("invalid_request")]
    InvalidRequest(BTreeMap<String, String>),

    #[error("server_error: {0}")]
    Server(#[from] fonoteca_metadata::MetadataError),
}

impl IntoResponse for OAuthError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::UnsupportedGrantType => (
                StatusCode::BAD_REQUEST,
                OAuthErrorResponse {
                    error: "unsupported_grant_type".to_string(),
                    error_description: None,
                    details: None,
                },
            ),
            Self::InvalidClient => (
                StatusCode::UNAUTHORIZED,
                OAuthErrorResponse {
                    error: "invalid_client".to_string(),
                    error_description: None,
                    details: None,
                },
            ),
            Self::InvalidGrant(description) => (
                StatusCode::BAD_REQUEST,
                OAuthErrorResponse {
                    error: "invalid_grant".to_string(),
                    error_description: Some(description),
                    details: None,
                },
            ),
            Self::InvalidRequest(details) => (
                StatusCode::BAD_REQUEST,
                OAuthErrorResponse {
                    error: "invalid_request".to_string(),
                    error_description: None,
                    details: Some(details),
                },
            ),
            Self::Server(e) => {
                tracing::error!(error = %e, "token endpoint metadata failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    OAuthErrorResponse {
                        error: "server_error".to_string(),
                        error_description: None,
                        details: None,
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
