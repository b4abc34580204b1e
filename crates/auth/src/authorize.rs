use thiserror::Error;

use crate::{IdentityClaims, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("no authenticated identity")]
    Unauthenticated,

    #[error("forbidden: role '{actual}' does not satisfy required role '{required}'")]
    RoleMismatch { required: Role, actual: Role },
}

/// Role gate decision.
///
/// - No IO
/// - No panics
/// - Exact role match; there is no role hierarchy
pub fn require_role(claims: Option<&IdentityClaims>, required: &Role) -> Result<(), AuthzError> {
    let claims = claims.ok_or(AuthzError::Unauthenticated)?;

    if claims.role != *required {
        return Err(AuthzError::RoleMismatch {
            required: required.clone(),
            actual: claims.role.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gatekeep_core::TenantId;

    fn claims_with(role: &str) -> IdentityClaims {
        IdentityClaims::new(
            "user-1",
            "a@x.com",
            TenantId::new("tenant-1").unwrap(),
            Role::new(role.to_string()),
            Utc::now(),
        )
    }

    #[test]
    fn missing_identity_is_unauthenticated() {
        assert_eq!(require_role(None, &Role::ADMIN), Err(AuthzError::Unauthenticated));
    }

    #[test]
    fn wrong_role_is_a_mismatch() {
        let claims = claims_with("viewer");
        let err = require_role(Some(&claims), &Role::ADMIN).unwrap_err();

        assert_eq!(
            err,
            AuthzError::RoleMismatch {
                required: Role::ADMIN,
                actual: Role::new("viewer"),
            }
        );
    }

    #[test]
    fn matching_role_is_allowed() {
        let claims = claims_with("admin");
        assert!(require_role(Some(&claims), &Role::ADMIN).is_ok());
    }
}
