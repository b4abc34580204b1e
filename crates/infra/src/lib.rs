//! Infrastructure layer: credential-store adapters.

pub mod users;

pub use users::{
    InMemoryUserStore, PostgresUserStore, StoreError, UserRecord, UserStore, UserUpdate,
};
