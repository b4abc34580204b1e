//! `gatekeep-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it hashes
//! credentials, mints and verifies signed tokens, and makes role decisions.

pub mod authorize;
pub mod claims;
pub mod hasher;
pub mod roles;
pub mod token;

pub use authorize::{AuthzError, require_role};
pub use claims::IdentityClaims;
pub use hasher::{CredentialHasher, PasswordDigest, Sha256Hasher, hash_password};
pub use roles::Role;
pub use token::{
    KeyError, SigningError, SigningKey, TOKEN_TTL_SECS, TokenError, TokenIssuer, TokenValidator,
    TokenVerifier,
};
