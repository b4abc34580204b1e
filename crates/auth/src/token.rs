//! Signed session tokens (HS256 JWT).
//!
//! The issuer and validator share one process-wide [`SigningKey`]. The
//! validator accepts exactly one algorithm; the algorithm declared in a token
//! header is checked against it before any signature work happens.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;
use serde::Deserialize;
use thiserror::Error;

use gatekeep_core::TenantId;

use crate::{IdentityClaims, Role};

/// Token lifetime: 24 hours.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// The only signing algorithm this system issues or accepts.
pub const ALGORITHM: Algorithm = Algorithm::HS256;
const ALGORITHM_NAME: &str = "HS256";

// =============================================================================
// SigningKey
// =============================================================================

/// Process-wide HMAC secret.
///
/// Constructed once at startup and handed to [`TokenIssuer::new`] and
/// [`TokenValidator::new`]. Immutable; cloning shares the same bytes.
#[derive(Clone)]
pub struct SigningKey(Arc<[u8]>);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("signing key must not be empty")]
    Empty,
}

impl SigningKey {
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, KeyError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(KeyError::Empty);
        }
        if secret.len() < 32 {
            tracing::warn!(len = secret.len(), "signing key is shorter than 32 bytes");
        }
        Ok(Self(secret.into()))
    }

    /// Random 32-byte key that lives only as long as the process.
    ///
    /// Tokens signed with it do not survive a restart.
    pub fn ephemeral() -> Self {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        Self(Arc::from(&bytes[..]))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SigningKey").field("len", &self.0.len()).finish_non_exhaustive()
    }
}

// =============================================================================
// Errors
// =============================================================================

/// The signing primitive failed. Never caused by caller input.
#[derive(Debug, Error)]
#[error("failed to sign token: {0}")]
pub struct SigningError(#[from] jsonwebtoken::errors::Error);

/// Why a token was rejected.
///
/// For diagnostics only: the HTTP boundary reports every variant the same way.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    SignatureInvalid,

    #[error("token has expired")]
    Expired,
}

// =============================================================================
// TokenIssuer
// =============================================================================

/// Mints signed tokens for authenticated identities.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: Arc<EncodingKey>,
    header: Header,
}

impl TokenIssuer {
    pub fn new(key: &SigningKey) -> Self {
        Self {
            encoding_key: Arc::new(EncodingKey::from_secret(key.as_bytes())),
            header: Header::new(ALGORITHM),
        }
    }

    /// Issue a token valid from now for [`TOKEN_TTL_SECS`].
    pub fn issue(
        &self,
        subject: &str,
        email: &str,
        tenant_id: &TenantId,
        role: &Role,
    ) -> Result<String, SigningError> {
        self.issue_at(subject, email, tenant_id, role, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject: &str,
        email: &str,
        tenant_id: &TenantId,
        role: &Role,
        now: DateTime<Utc>,
    ) -> Result<String, SigningError> {
        let claims = IdentityClaims::new(subject, email, tenant_id.clone(), role.clone(), now);
        self.sign(&claims)
    }

    /// Sign an already-built claim set.
    pub fn sign(&self, claims: &IdentityClaims) -> Result<String, SigningError> {
        Ok(encode(&self.header, claims, &self.encoding_key)?)
    }
}

impl core::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenIssuer").field("algorithm", &self.header.alg).finish()
    }
}

// =============================================================================
// TokenValidator
// =============================================================================

/// Verification seam used by the HTTP gate.
pub trait TokenVerifier: Send + Sync {
    /// Verify `token` as of `now` and return its claims unchanged.
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<IdentityClaims, TokenError>;
}

/// HS256 validator pinned to a single algorithm.
#[derive(Clone)]
pub struct TokenValidator {
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl TokenValidator {
    pub fn new(key: &SigningKey) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked against the caller's clock in `validate`.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: Arc::new(DecodingKey::from_secret(key.as_bytes())),
            validation: Arc::new(validation),
        }
    }
}

impl TokenVerifier for TokenValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<IdentityClaims, TokenError> {
        if declared_algorithm(token)? != ALGORITHM_NAME {
            return Err(TokenError::SignatureInvalid);
        }

        let data = decode::<IdentityClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| classify(e.kind()))?;

        if data.claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

impl core::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenValidator").field("algorithm", &ALGORITHM).finish()
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Read the `alg` a token claims for itself, without trusting anything else.
///
/// Names outside the library's algorithm enum (e.g. `"none"`) are reported as
/// they are, so they can be rejected as a signature problem instead of a parse
/// problem.
fn declared_algorithm(token: &str) -> Result<String, TokenError> {
    let mut segments = token.split('.');
    let (Some(header), Some(_payload), Some(_signature), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        return Err(TokenError::Malformed);
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| TokenError::Malformed)?;
    let header: RawHeader = serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)?;

    Ok(header.alg)
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName => TokenError::SignatureInvalid,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}

// =============================================================================
// Tests
// =============================================================================
