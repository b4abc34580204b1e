use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gatekeep_auth::IdentityClaims;
use gatekeep_infra::UserRecord;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserView,
}

/// All fields are required; missing ones deserialize empty and are rejected
/// by the handler.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub tenant_id: Option<String>,
    pub role: Option<String>,
}

/// Public shape of a user record. The password digest never leaves the store.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub tenant_id: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&UserRecord> for UserView {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            tenant_id: user.tenant_id.to_string(),
            role: user.role.to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// The identity a verified token carries, as seen by the handler.
#[derive(Debug, Serialize)]
pub struct ClaimsView {
    pub user_id: String,
    pub email: String,
    pub tenant_id: String,
    pub role: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl From<&IdentityClaims> for ClaimsView {
    fn from(claims: &IdentityClaims) -> Self {
        Self {
            user_id: claims.subject.clone(),
            email: claims.email.clone(),
            tenant_id: claims.tenant_id.to_string(),
            role: claims.role.to_string(),
            issued_at: claims.issued_at.timestamp(),
            expires_at: claims.expires_at.timestamp(),
        }
    }
}

/// Trimmed value, or `None` when blank.
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
