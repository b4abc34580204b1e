use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    handler::Handler,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::get,
};

use gatekeep_auth::Role;
use gatekeep_core::{TenantId, UserId};
use gatekeep_infra::UserUpdate;

use crate::app::dto::{self, CreateUserRequest, UpdateUserRequest, UserView};
use crate::app::errors::ApiError;
use crate::app::routes::json_body;
use crate::app::services::{AppServices, NewUser};
use crate::context::ClaimsContext;
use crate::middleware::{RoleRequirement, role_gate};

pub fn router() -> Router {
    let admin_only = from_fn_with_state(RoleRequirement::admin(), role_gate);

    Router::new()
        .route(
            "/",
            get(list_users).post(create_user.layer(admin_only.clone())),
        )
        .route(
            "/:id",
            get(get_user)
                .put(update_user)
                .delete(delete_user.layer(admin_only)),
        )
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<UserView>>, ApiError> {
    let users = services.list_users().await?;
    Ok(Json(users.iter().map(UserView::from).collect()))
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: ClaimsContext,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserView>), ApiError> {
    let body = json_body(body)?;
    let new = validate_new_user(body)?;

    let user = services.create_user(new).await?;
    tracing::info!(
        actor = %ctx.subject(),
        actor_tenant = %ctx.tenant_id(),
        user_id = %user.id,
        role = %user.role,
        "user created"
    );

    Ok((StatusCode::CREATED, Json(UserView::from(&user))))
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<UserView>, ApiError> {
    let user = services.get_user(id.parse()?).await?;
    Ok(Json(UserView::from(&user)))
}

/// Any authenticated caller may update any record, `role` included. Only
/// create and delete sit behind the admin gate.
pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: ClaimsContext,
    Path(id): Path<String>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserView>, ApiError> {
    let id: UserId = id.parse()?;
    let changes = validate_update(json_body(body)?)?;

    let user = services.update_user(id, changes).await?;
    tracing::info!(
        actor = %ctx.subject(),
        actor_role = %ctx.role(),
        user_id = %user.id,
        role = %user.role,
        "user updated"
    );

    Ok(Json(UserView::from(&user)))
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    ctx: ClaimsContext,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: UserId = id.parse()?;
    services.delete_user(id).await?;
    tracing::info!(
        actor = %ctx.subject(),
        actor_tenant = %ctx.tenant_id(),
        user_id = %id,
        "user deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

fn validate_new_user(body: CreateUserRequest) -> Result<NewUser, ApiError> {
    const REQUIRED: ApiError =
        ApiError::Validation("name, email, password, tenant_id and role are required");

    let (Some(name), Some(email), Some(tenant), Some(role)) = (
        dto::non_blank(&body.name),
        dto::non_blank(&body.email),
        dto::non_blank(&body.tenant_id),
        dto::non_blank(&body.role),
    ) else {
        return Err(REQUIRED);
    };
    if body.password.is_empty() {
        return Err(REQUIRED);
    }

    Ok(NewUser {
        name: name.to_string(),
        email: email.to_string(),
        tenant_id: TenantId::new(tenant)?,
        role: Role::new(role.to_string()),
        password: body.password,
    })
}

fn validate_update(body: UpdateUserRequest) -> Result<UserUpdate, ApiError> {
    fn field(value: Option<String>) -> Result<Option<String>, ApiError> {
        match value {
            None => Ok(None),
            Some(v) => dto::non_blank(&v)
                .map(|v| Some(v.to_string()))
                .ok_or(ApiError::Validation("fields must not be empty")),
        }
    }

    Ok(UserUpdate {
        name: field(body.name)?,
        email: field(body.email)?,
        tenant_id: field(body.tenant_id)?.map(TenantId::new).transpose()?,
        role: field(body.role)?.map(Role::from),
    })
}
