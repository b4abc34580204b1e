//! Process configuration, read once at startup.
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `JWT_SECRET` | HS256 signing secret (required) |
//! | `GATEKEEP_DEV_SIGNING_KEY` | `1`/`true`: use a random per-process secret when `JWT_SECRET` is unset |
//! | `PORT` | listen port on `0.0.0.0` (default `8080`) |
//! | `DATABASE_URL` | Postgres credential store; in-memory when unset |
//! | `GATEKEEP_ADMIN_EMAIL`, `GATEKEEP_ADMIN_PASSWORD` | seed an admin account if absent |
//! | `GATEKEEP_ADMIN_TENANT` | tenant for the seeded admin (default `default`) |

use std::net::{Ipv4Addr, SocketAddr};

use thiserror::Error;

use gatekeep_auth::{KeyError, SigningKey};
use gatekeep_core::{DomainError, TenantId};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ADMIN_TENANT: &str = "default";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET is not set (set GATEKEEP_DEV_SIGNING_KEY=1 to run with a throwaway key)")]
    MissingSigningKey,

    #[error("invalid JWT_SECRET: {0}")]
    InvalidSigningKey(#[from] KeyError),

    #[error("invalid PORT value '{0}'")]
    InvalidPort(String),

    #[error("GATEKEEP_ADMIN_EMAIL and GATEKEEP_ADMIN_PASSWORD must be set together")]
    IncompleteBootstrapAdmin,

    #[error("invalid GATEKEEP_ADMIN_TENANT: {0}")]
    InvalidAdminTenant(#[from] DomainError),
}

/// Admin account created at startup when no account holds its email.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
    pub tenant_id: TenantId,
}

impl core::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub signing_key: SigningKey,
    pub database_url: Option<String>,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let signing_key = match var("JWT_SECRET") {
            Some(secret) => SigningKey::new(secret)?,
            None if var("GATEKEEP_DEV_SIGNING_KEY").is_some_and(|v| is_truthy(&v)) => {
                tracing::warn!("JWT_SECRET not set; using an ephemeral signing key");
                SigningKey::ephemeral()
            }
            None => return Err(ConfigError::MissingSigningKey),
        };

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let bootstrap_admin = match (var("GATEKEEP_ADMIN_EMAIL"), var("GATEKEEP_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => {
                let tenant = var("GATEKEEP_ADMIN_TENANT")
                    .unwrap_or_else(|| DEFAULT_ADMIN_TENANT.to_string());
                Some(BootstrapAdmin {
                    email,
                    password,
                    tenant_id: TenantId::new(tenant)?,
                })
            }
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteBootstrapAdmin),
        };

        Ok(Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            signing_key,
            database_url: var("DATABASE_URL"),
            bootstrap_admin,
        })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn missing_secret_is_fatal() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSigningKey));

        // Blank counts as missing.
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSigningKey));
    }

    #[test]
    fn dev_flag_allows_ephemeral_key() {
        assert!(AppConfig::from_lookup(lookup(&[("GATEKEEP_DEV_SIGNING_KEY", "true")])).is_ok());
        assert!(AppConfig::from_lookup(lookup(&[("GATEKEEP_DEV_SIGNING_KEY", "1")])).is_ok());

        let err =
            AppConfig::from_lookup(lookup(&[("GATEKEEP_DEV_SIGNING_KEY", "no")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSigningKey));
    }

    #[test]
    fn defaults_apply() {
        let cfg = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(cfg.bind_addr.port(), DEFAULT_PORT);
        assert!(cfg.bind_addr.ip().is_unspecified());
        assert!(cfg.database_url.is_none());
        assert!(cfg.bootstrap_admin.is_none());
    }

    #[test]
    fn port_must_be_numeric() {
        let cfg = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s"), ("PORT", "9090")])).unwrap();
        assert_eq!(cfg.bind_addr.port(), 9090);

        let err =
            AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s"), ("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(v) if v == "http"));
    }

    #[test]
    fn bootstrap_admin_needs_email_and_password() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("GATEKEEP_ADMIN_EMAIL", "root@example.com"),
            ("GATEKEEP_ADMIN_PASSWORD", "hunter2"),
        ]))
        .unwrap();
        let admin = cfg.bootstrap_admin.unwrap();
        assert_eq!(admin.email, "root@example.com");
        assert_eq!(admin.tenant_id.as_str(), DEFAULT_ADMIN_TENANT);
        assert!(!format!("{admin:?}").contains("hunter2"));

        let err = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("GATEKEEP_ADMIN_EMAIL", "root@example.com"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::IncompleteBootstrapAdmin));
    }
}
