//! API error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::upstream::UpstreamError;

/// Errors surfaced to API clients.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session not active: {0}")]
    SessionNotActive(String),

    #[error("Session already active: {0}")]
    SessionAlreadyActive(String),

    #[error("Case not found: {0}")]
    CaseNotFound(String),

    #[error("Upstream failure: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::SessionNotActive(_)
            | ApiError::SessionAlreadyActive(_) => StatusCode::BAD_REQUEST,
            ApiError::SessionNotFound(_) | ApiError::CaseNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::SessionNotFound(_) => "session_not_found",
            ApiError::SessionNotActive(_) => "session_not_active",
            ApiError::SessionAlreadyActive(_) => "session_already_active",
            ApiError::CaseNotFound(_) => "case_not_found",
            ApiError::Upstream(_) => "upstream_error",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Upstream(inner) => warn!(code = self.code(), "{inner}"),
            ApiError::Internal(message) => error!(code = self.code(), "{message}"),
            _ => {}
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        });

        (self.status(), body).into_response()
    }
}

impl From<osce_core::Error> for ApiError {
    fn from(err: osce_core::Error) -> Self {
        use osce_core::Error as Core;
        match err {
            Core::SessionNotFound(id) => ApiError::SessionNotFound(id),
            Core::SessionNotActive(id) => ApiError::SessionNotActive(id),
            Core::SessionAlreadyActive(id) => ApiError::SessionAlreadyActive(id),
            Core::CaseNotFound(reference) => ApiError::CaseNotFound(reference),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
