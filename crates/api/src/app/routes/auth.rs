use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    routing::{get, post},
};

use gatekeep_core::UserId;

use crate::app::dto::{self, ClaimsView, LoginRequest, LoginResponse, UserView};
use crate::app::errors::ApiError;
use crate::app::routes::json_body;
use crate::app::services::AppServices;
use crate::context::ClaimsContext;

pub fn public_router() -> Router {
    Router::new().route("/api/auth/login", post(login))
}

pub fn protected_router() -> Router {
    Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/auth/whoami", get(whoami))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let body = json_body(body)?;
    const REQUIRED: ApiError = ApiError::Validation("email and password are required");

    let email = dto::non_blank(&body.email).ok_or(REQUIRED)?;
    if body.password.is_empty() {
        return Err(REQUIRED);
    }

    let (token, user) = services.login(email, &body.password).await?;

    Ok(Json(LoginResponse {
        token,
        user: UserView::from(&user),
    }))
}

/// The stored record of the token's subject.
pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: ClaimsContext,
) -> Result<Json<UserView>, ApiError> {
    // A subject that is not one of our ids cannot have a record.
    let id: UserId = ctx.subject().parse().map_err(|_| ApiError::NotFound)?;
    let user = services.get_user(id).await?;
    Ok(Json(UserView::from(&user)))
}

/// The identity exactly as the verified token carries it.
pub async fn whoami(ctx: ClaimsContext) -> Json<ClaimsView> {
    Json(ClaimsView::from(ctx.claims()))
}
