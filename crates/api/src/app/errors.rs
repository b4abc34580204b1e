use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use gatekeep_auth::{AuthzError, SigningError};
use gatekeep_core::DomainError;
use gatekeep_infra::StoreError;

/// Every failure a handler or gate can report.
///
/// Response bodies are fixed strings; anything internal only reaches the log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation error: {0}")]
    Validation(&'static str),

    /// Missing, malformed, forged or expired bearer token.
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(msg) => json_error(status, "validation_error", msg),
            ApiError::Unauthenticated => {
                json_error(status, "unauthorized", "invalid or missing token")
            }
            ApiError::InvalidCredentials => {
                json_error(status, "invalid_credentials", "invalid email or password")
            }
            ApiError::Forbidden => json_error(status, "forbidden", "admin access required"),
            ApiError::NotFound => json_error(status, "not_found", "user not found"),
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                json_error(status, "internal_error", "internal server error")
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound,
            err @ StoreError::Duplicate => ApiError::Internal(err.to_string()),
            StoreError::Backend(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<SigningError> for ApiError {
    fn from(err: SigningError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => ApiError::Unauthenticated,
            AuthzError::RoleMismatch { .. } => ApiError::Forbidden,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidId(_) => ApiError::Validation("invalid user id"),
            DomainError::Validation(_) => ApiError::Validation("invalid field value"),
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
