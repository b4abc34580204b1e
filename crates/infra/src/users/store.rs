use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use thiserror::Error;

use gatekeep_auth::{PasswordDigest, Role};
use gatekeep_core::{TenantId, UserId};

/// A user account as held by the credential store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_digest: PasswordDigest,
    pub tenant_id: TenantId,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// New record with a fresh id, created and updated at `now`.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_digest: PasswordDigest,
        tenant_id: TenantId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Self {
        // Postgres keeps microseconds; truncate so a stored record reads back equal.
        let now = now.trunc_subsecs(6);
        Self {
            id: UserId::new(),
            name: name.into(),
            email: email.into(),
            password_digest,
            tenant_id,
            role,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of the mutable profile fields. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub tenant_id: Option<TenantId>,
    pub role: Option<Role>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.tenant_id.is_none()
            && self.role.is_none()
    }

    /// Apply to a record in place, stamping `updated_at`.
    pub fn apply_to(&self, user: &mut UserRecord, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(tenant_id) = &self.tenant_id {
            user.tenant_id = tenant_id.clone();
        }
        if let Some(role) = &self.role {
            user.role = role.clone();
        }
        user.updated_at = now.trunc_subsecs(6);
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("user not found")]
    NotFound,

    #[error("a user with this email already exists")]
    Duplicate,

    /// Storage failure. The message is for logs, not for clients.
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Credential store contract consumed by login and user management.
///
/// Implementations compare digests by equality and never see plaintext.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// The record whose email and stored digest both match.
    async fn find_by_email_and_digest(
        &self,
        email: &str,
        digest: &PasswordDigest,
    ) -> Result<UserRecord, StoreError>;

    /// Fails with [`StoreError::Duplicate`] when the email is taken.
    async fn insert(&self, user: UserRecord) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<UserRecord, StoreError>;

    /// All records, ordered by id.
    async fn list(&self) -> Result<Vec<UserRecord>, StoreError>;

    /// Returns the record as stored after the update.
    async fn update(&self, id: UserId, fields: UserUpdate) -> Result<UserRecord, StoreError>;

    async fn delete(&self, id: UserId) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn find_by_email_and_digest(
        &self,
        email: &str,
        digest: &PasswordDigest,
    ) -> Result<UserRecord, StoreError> {
        (**self).find_by_email_and_digest(email, digest).await
    }

    async fn insert(&self, user: UserRecord) -> Result<(), StoreError> {
        (**self).insert(user).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<UserRecord, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        (**self).list().await
    }

    async fn update(&self, id: UserId, fields: UserUpdate) -> Result<UserRecord, StoreError> {
        (**self).update(id, fields).await
    }

    async fn delete(&self, id: UserId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }
}
