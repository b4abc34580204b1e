use axum::Json;
use axum::Router;
use axum::extract::rejection::JsonRejection;

use crate::app::errors::ApiError;

pub mod auth;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .merge(auth::protected_router())
        .nest("/api/users", users::router())
}

/// Router for endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", axum::routing::get(system::health))
        .merge(auth::public_router())
}

/// Unwrap a JSON body, turning any rejection into a 400.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "rejected request body");
            Err(ApiError::Validation("invalid request body"))
        }
    }
}
