use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use gatekeep_core::TenantId;

use crate::Role;
use crate::token::TOKEN_TTL_SECS;

/// Identity claims embedded in a token.
///
/// The claim names match the tokens the service has always issued
/// (`user_id`, `email`, `tenant_id`, `role`, `iat`, `exp`). Timestamps are
/// whole seconds, so a value survives encode/decode unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject identifier (the user record id).
    #[serde(rename = "user_id")]
    pub subject: String,

    pub email: String,

    /// Carried for collaborators; no gate in this crate enforces it.
    pub tenant_id: TenantId,

    pub role: Role,

    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl IdentityClaims {
    /// Build claims issued at `now`, expiring one token lifetime later.
    pub fn new(
        subject: impl Into<String>,
        email: impl Into<String>,
        tenant_id: TenantId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Self {
        let issued_at = now.trunc_subsecs(0);
        Self {
            subject: subject.into(),
            email: email.into(),
            tenant_id,
            role,
            issued_at,
            expires_at: issued_at + Duration::seconds(TOKEN_TTL_SECS),
        }
    }

    /// A token is still good at exactly `expires_at`; it lapses strictly after.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(now: DateTime<Utc>) -> IdentityClaims {
        IdentityClaims::new(
            "0192f0c4-0000-7000-8000-000000000001",
            "a@x.com",
            TenantId::new("acme").unwrap(),
            Role::ADMIN,
            now,
        )
    }

    #[test]
    fn lifetime_is_one_day_from_whole_second() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() + Duration::milliseconds(750);
        let claims = sample(now);

        assert_eq!(claims.issued_at, Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
        assert_eq!(claims.expires_at - claims.issued_at, Duration::hours(24));
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let claims = sample(Utc::now());

        assert!(!claims.is_expired_at(claims.issued_at));
        assert!(!claims.is_expired_at(claims.expires_at));
        assert!(claims.is_expired_at(claims.expires_at + Duration::seconds(1)));
    }

    #[test]
    fn wire_names_and_numeric_timestamps() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let value = serde_json::to_value(sample(now)).unwrap();

        assert_eq!(value["user_id"], "0192f0c4-0000-7000-8000-000000000001");
        assert_eq!(value["tenant_id"], "acme");
        assert_eq!(value["role"], "admin");
        assert_eq!(value["iat"], now.timestamp());
        assert_eq!(value["exp"], now.timestamp() + TOKEN_TTL_SECS);
    }
}
