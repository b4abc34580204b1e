//! `gatekeep-core`: shared identifiers and the domain error model.
//!
//! This crate contains no transport or storage concerns.

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::{TenantId, UserId};
