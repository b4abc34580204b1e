//! Credential store boundary.
//!
//! The auth core only ever talks to [`UserStore`]; the backing storage is a
//! deployment choice (in-memory for tests/dev, Postgres in production).

pub mod in_memory;
pub mod postgres;
pub mod store;

pub use in_memory::InMemoryUserStore;
pub use postgres::PostgresUserStore;
pub use store::{StoreError, UserRecord, UserStore, UserUpdate};
