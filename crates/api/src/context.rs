use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::Extensions;
use axum::http::request::Parts;
use thiserror::Error;

use gatekeep_auth::{IdentityClaims, Role};
use gatekeep_core::TenantId;

use crate::app::errors::ApiError;

/// Verified identity for the current request.
///
/// Attached once by the auth middleware and read-only afterwards. Handlers
/// behind the gate take it as an extractor; a request that never passed the
/// gate has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimsContext {
    claims: Arc<IdentityClaims>,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("claims are already attached to this request")]
pub struct AlreadyAttached;

impl ClaimsContext {
    /// Attach verified claims. A request carries at most one identity.
    pub fn attach(
        extensions: &mut Extensions,
        claims: IdentityClaims,
    ) -> Result<(), AlreadyAttached> {
        if extensions.get::<ClaimsContext>().is_some() {
            return Err(AlreadyAttached);
        }
        extensions.insert(ClaimsContext {
            claims: Arc::new(claims),
        });
        Ok(())
    }

    pub fn read(extensions: &Extensions) -> Option<&ClaimsContext> {
        extensions.get::<ClaimsContext>()
    }

    pub fn claims(&self) -> &IdentityClaims {
        &self.claims
    }

    pub fn subject(&self) -> &str {
        &self.claims.subject
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.claims.tenant_id
    }

    pub fn role(&self) -> &Role {
        &self.claims.role
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClaimsContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        ClaimsContext::read(&parts.extensions)
            .cloned()
            .ok_or(ApiError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn claims(role: &str) -> IdentityClaims {
        IdentityClaims::new(
            "u-1",
            "a@x.com",
            TenantId::new("t-1").unwrap(),
            Role::new(role.to_string()),
            Utc::now(),
        )
    }

    #[test]
    fn absent_until_attached() {
        let mut ext = Extensions::new();
        assert!(ClaimsContext::read(&ext).is_none());

        let issued = claims("user");
        ClaimsContext::attach(&mut ext, issued.clone()).unwrap();

        let ctx = ClaimsContext::read(&ext).unwrap();
        assert_eq!(ctx.claims(), &issued);
        assert_eq!(ctx.subject(), "u-1");
        assert_eq!(ctx.claims().email, "a@x.com");
        assert_eq!(ctx.tenant_id().as_str(), "t-1");
        assert_eq!(ctx.role().as_str(), "user");
    }

    #[test]
    fn second_attach_is_refused() {
        let mut ext = Extensions::new();
        ClaimsContext::attach(&mut ext, claims("user")).unwrap();

        assert_eq!(ClaimsContext::attach(&mut ext, claims("admin")), Err(AlreadyAttached));
        assert_eq!(ClaimsContext::read(&ext).unwrap().role().as_str(), "user");
    }
}
