use std::sync::Arc;

use chrono::Utc;

use gatekeep_auth::{CredentialHasher, Role, TokenIssuer};
use gatekeep_core::{TenantId, UserId};
use gatekeep_infra::{StoreError, UserRecord, UserStore, UserUpdate};

use crate::app::errors::ApiError;
use crate::config::BootstrapAdmin;

/// Everything a handler needs, shared behind an `Arc`.
pub struct AppServices {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn CredentialHasher>,
    issuer: TokenIssuer,
}

/// Input for account creation, already validated by the handler.
#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub tenant_id: TenantId,
    pub role: Role,
}

impl AppServices {
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn CredentialHasher>,
        issuer: TokenIssuer,
    ) -> Self {
        Self {
            store,
            hasher,
            issuer,
        }
    }

    /// Check credentials and issue a token for the matching account.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, UserRecord), ApiError> {
        let digest = self.hasher.hash(password);

        let user = match self.store.find_by_email_and_digest(email, &digest).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                tracing::info!("login rejected");
                return Err(ApiError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        let token = self.issuer.issue(
            &user.id.to_string(),
            &user.email,
            &user.tenant_id,
            &user.role,
        )?;

        tracing::info!(user_id = %user.id, tenant_id = %user.tenant_id, "login succeeded");
        Ok((token, user))
    }

    pub async fn create_user(&self, new: NewUser) -> Result<UserRecord, ApiError> {
        let user = UserRecord::new(
            new.name,
            new.email,
            self.hasher.hash(&new.password),
            new.tenant_id,
            new.role,
            Utc::now(),
        );
        self.store.insert(user.clone()).await?;
        Ok(user)
    }

    pub async fn get_user(&self, id: UserId) -> Result<UserRecord, ApiError> {
        Ok(self.store.find_by_id(id).await?)
    }

    pub async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError> {
        Ok(self.store.list().await?)
    }

    pub async fn update_user(
        &self,
        id: UserId,
        changes: UserUpdate,
    ) -> Result<UserRecord, ApiError> {
        Ok(self.store.update(id, changes).await?)
    }

    pub async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        Ok(self.store.delete(id).await?)
    }

    /// Create the configured admin unless an account already holds its email.
    ///
    /// Returns whether an account was created.
    pub async fn bootstrap_admin(&self, admin: &BootstrapAdmin) -> Result<bool, StoreError> {
        let exists = self
            .store
            .list()
            .await?
            .iter()
            .any(|u| u.email == admin.email);
        if exists {
            tracing::debug!(email = %admin.email, "bootstrap admin already present");
            return Ok(false);
        }

        let user = UserRecord::new(
            "Administrator",
            admin.email.clone(),
            self.hasher.hash(&admin.password),
            admin.tenant_id.clone(),
            Role::ADMIN,
            Utc::now(),
        );
        match self.store.insert(user).await {
            Ok(()) => {
                tracing::info!(email = %admin.email, "bootstrap admin created");
                Ok(true)
            }
            // Lost a race with another instance.
            Err(StoreError::Duplicate) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatekeep_auth::{Sha256Hasher, SigningKey, TokenValidator, TokenVerifier};
    use gatekeep_infra::InMemoryUserStore;

    fn services() -> (AppServices, TokenValidator) {
        let key = SigningKey::new("services-test-secret-0123456789abcdef").unwrap();
        let svc = AppServices::new(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(Sha256Hasher),
            TokenIssuer::new(&key),
        );
        (svc, TokenValidator::new(&key))
    }

    fn new_user(email: &str, password: &str) -> NewUser {
        NewUser {
            name: "Alice".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            tenant_id: TenantId::new("t-1").unwrap(),
            role: Role::new("user"),
        }
    }

    #[tokio::test]
    async fn login_issues_token_for_stored_identity() {
        let (svc, validator) = services();
        let created = svc.create_user(new_user("a@x.com", "pw123")).await.unwrap();

        let (token, user) = svc.login("a@x.com", "pw123").await.unwrap();
        assert_eq!(user, created);

        let claims = validator.validate(&token, Utc::now()).unwrap();
        assert_eq!(claims.subject, created.id.to_string());
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.tenant_id, created.tenant_id);
        assert_eq!(claims.role, created.role);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let (svc, _) = services();
        svc.create_user(new_user("a@x.com", "pw123")).await.unwrap();

        assert!(matches!(
            svc.login("a@x.com", "nope").await,
            Err(ApiError::InvalidCredentials)
        ));
        assert!(matches!(
            svc.login("ghost@x.com", "pw123").await,
            Err(ApiError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn duplicate_email_fails_as_a_store_error() {
        let (svc, _) = services();
        svc.create_user(new_user("a@x.com", "pw1")).await.unwrap();

        let err = svc.create_user(new_user("a@x.com", "pw2")).await.unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(svc.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn bootstrap_admin_is_idempotent() {
        let (svc, _) = services();
        let admin = BootstrapAdmin {
            email: "root@x.com".to_string(),
            password: "rootpw".to_string(),
            tenant_id: TenantId::new("default").unwrap(),
        };

        assert!(svc.bootstrap_admin(&admin).await.unwrap());
        assert!(!svc.bootstrap_admin(&admin).await.unwrap());

        let (_, user) = svc.login("root@x.com", "rootpw").await.unwrap();
        assert!(user.role.is_admin());
        assert_eq!(svc.list_users().await.unwrap().len(), 1);
    }
}
