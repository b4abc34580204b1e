//! Postgres-backed credential store.
//!
//! Expects the `users` table from `sql/users.sql`. Digests are stored in the
//! `password_hash` column exactly as produced by the credential hasher.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | RowNotFound / no row affected | N/A | `NotFound` |
//! | anything else | N/A | `Backend` |

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use gatekeep_auth::{PasswordDigest, Role};
use gatekeep_core::{TenantId, UserId};

use super::store::{StoreError, UserRecord, UserStore, UserUpdate};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, tenant_id, role, created_at, updated_at";

/// Credential store over a SQLx connection pool (`Send + Sync`, cheap to clone).
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: Arc<PgPool>,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }
}

#[async_trait::async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip_all, err)]
    async fn find_by_email_and_digest(
        &self,
        email: &str,
        digest: &PasswordDigest,
    ) -> Result<UserRecord, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND password_hash = $2"
        ))
        .bind(email)
        .bind(digest.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_email_and_digest", e))?
        .ok_or(StoreError::NotFound)?;

        user_from_row(&row).map_err(|e| map_sqlx_error("find_by_email_and_digest", e))
    }

    #[instrument(skip_all, fields(user_id = %user.id), err)]
    async fn insert(&self, user: UserRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, name, email, password_hash, tenant_id, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.password_digest.as_str())
        .bind(user.tenant_id.as_str())
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert", e))?;

        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find_by_id(&self, id: UserId) -> Result<UserRecord, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?
            .ok_or(StoreError::NotFound)?;

        user_from_row(&row).map_err(|e| map_sqlx_error("find_by_id", e))
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list", e))?;

        rows.iter()
            .map(|row| user_from_row(row).map_err(|e| map_sqlx_error("list", e)))
            .collect()
    }

    #[instrument(skip(self, changes), fields(user_id = %id), err)]
    async fn update(&self, id: UserId, changes: UserUpdate) -> Result<UserRecord, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                tenant_id = COALESCE($4, tenant_id),
                role = COALESCE($5, role),
                updated_at = $6
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(changes.name.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.tenant_id.as_ref().map(TenantId::as_str))
        .bind(changes.role.as_ref().map(Role::as_str))
        .bind(Utc::now())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?
        .ok_or(StoreError::NotFound)?;

        user_from_row(&row).map_err(|e| map_sqlx_error("update", e))
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn delete(&self, id: UserId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

fn user_from_row(row: &PgRow) -> Result<UserRecord, sqlx::Error> {
    let id: Uuid = row.try_get("id")?;
    let tenant_id: String = row.try_get("tenant_id")?;
    let role: String = row.try_get("role")?;
    let password_hash: String = row.try_get("password_hash")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

    Ok(UserRecord {
        id: UserId::from_uuid(id),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_digest: PasswordDigest::from_stored(password_hash),
        tenant_id: TenantId::new(tenant_id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        role: Role::from(role),
        created_at,
        updated_at,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            StoreError::Duplicate
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        _ => StoreError::backend(format!("{operation}: {err}")),
    }
}
