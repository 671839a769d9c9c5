//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use ootd_media::MediaError;

use crate::services::ServiceError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("Upstream error: {0}")]
    Upstream(#[from] ServiceError),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Media(e) if e.is_input_error() => StatusCode::BAD_REQUEST,
            ApiError::Media(MediaError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) | ApiError::Media(_) | ApiError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Validation(_) => "validation_failed",
            ApiError::Internal(_) => "internal",
            ApiError::Media(e) => e.kind(),
            ApiError::Upstream(_) => "upstream_failed",
        }
    }

    fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    code: &'static str,
}

const REDACTED_DETAIL: &str = "An internal error occurred";

/// Error code of a server-side failure, attached to the response so
/// outer layers can replace the detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternalErrorCode(pub &'static str);

/// Error body with the detail withheld.
pub fn redacted_response(status: StatusCode, code: &'static str) -> Response {
    let body = ErrorResponse {
        detail: REDACTED_DETAIL.to_string(),
        code,
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let internal = self.is_internal();

        if internal {
            error!(code, error = %self, "Request failed");
        }

        let body = ErrorResponse {
            detail: self.to_string(),
            code,
        };

        let mut response = (status, Json(body)).into_response();
        if internal {
            response.extensions_mut().insert(InternalErrorCode(code));
        }
        response
    }
}
