use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::Utc;

use gatekeep_auth::PasswordDigest;
use gatekeep_core::UserId;

use super::store::{StoreError, UserRecord, UserStore, UserUpdate};

/// In-memory credential store for tests/dev.
///
/// Keyed by [`UserId`] (UUIDv7), so listing is roughly in creation order.
/// Email uniqueness is enforced on insert and on update.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<BTreeMap<UserId, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::backend("in-memory user store lock poisoned")
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email_and_digest(
        &self,
        email: &str,
        digest: &PasswordDigest,
    ) -> Result<UserRecord, StoreError> {
        let map = self.inner.read().map_err(|_| Self::poisoned())?;
        map.values()
            .find(|u| u.email == email && u.password_digest == *digest)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn insert(&self, user: UserRecord) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;
        if map.values().any(|u| u.email == user.email) || map.contains_key(&user.id) {
            return Err(StoreError::Duplicate);
        }
        map.insert(user.id, user);
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<UserRecord, StoreError> {
        let map = self.inner.read().map_err(|_| Self::poisoned())?;
        map.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        let map = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(map.values().cloned().collect())
    }

    async fn update(&self, id: UserId, fields: UserUpdate) -> Result<UserRecord, StoreError> {
        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;

        if let Some(email) = &fields.email {
            if map.values().any(|u| u.id != id && u.email == *email) {
                return Err(StoreError::Duplicate);
            }
        }

        let user = map.get_mut(&id).ok_or(StoreError::NotFound)?;
        fields.apply_to(user, Utc::now());
        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;
        map.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}
