use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use gatekeep_auth::{AuthzError, Role, TokenVerifier, require_role};

use crate::app::errors::ApiError;
use crate::context::ClaimsContext;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn TokenVerifier>,
}

/// Bearer-token gate. Every failure gets the same 401 body; the reason is
/// only logged.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_bearer(req.headers()) else {
        tracing::debug!(path = %req.uri().path(), "missing bearer token");
        return Err(ApiError::Unauthenticated);
    };

    let claims = state.verifier.validate(token, Utc::now()).map_err(|reason| {
        tracing::debug!(%reason, "bearer token rejected");
        ApiError::Unauthenticated
    })?;

    ClaimsContext::attach(req.extensions_mut(), claims)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(next.run(req).await)
}

/// Role required by [`role_gate`] on a route.
#[derive(Debug, Clone)]
pub struct RoleRequirement(pub Role);

impl RoleRequirement {
    pub fn admin() -> Self {
        Self(Role::ADMIN)
    }
}

/// Runs after [`auth_middleware`]; a request without claims is 401, a wrong
/// role is 403.
pub async fn role_gate(
    State(RoleRequirement(required)): State<RoleRequirement>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = ClaimsContext::read(req.extensions()).map(ClaimsContext::claims);

    if let Err(err) = require_role(claims, &required) {
        if let AuthzError::RoleMismatch { required, actual } = &err {
            tracing::info!(%required, %actual, path = %req.uri().path(), "role check failed");
        }
        return Err(err.into());
    }

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header::AUTHORIZATION};

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(extract_bearer(&headers("Bearer   padded  ")), Some("padded"));
    }

    #[test]
    fn rejects_other_schemes_and_empty_tokens() {
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
        assert_eq!(extract_bearer(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(extract_bearer(&headers("abc.def.ghi")), None);
        assert_eq!(extract_bearer(&headers("Bearer ")), None);
        assert_eq!(extract_bearer(&headers("Bearer    ")), None);
    }
}
