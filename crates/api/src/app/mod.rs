//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: credential store, hasher and token issuer behind one handle
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{Extension, Router};
use tower::ServiceBuilder;

use gatekeep_auth::{Sha256Hasher, TokenIssuer, TokenValidator, TokenVerifier};
use gatekeep_infra::{InMemoryUserStore, PostgresUserStore, UserStore};

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router from startup configuration (used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let store: Arc<dyn UserStore> = match &config.database_url {
        Some(url) => Arc::new(
            PostgresUserStore::connect(url)
                .await
                .context("failed to connect to the credential store")?,
        ),
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory credential store");
            Arc::new(InMemoryUserStore::new())
        }
    };

    let services = AppServices::new(
        store,
        Arc::new(Sha256Hasher),
        TokenIssuer::new(&config.signing_key),
    );

    if let Some(admin) = &config.bootstrap_admin {
        services
            .bootstrap_admin(admin)
            .await
            .context("failed to create bootstrap admin")?;
    }

    let verifier = Arc::new(TokenValidator::new(&config.signing_key));
    Ok(router(Arc::new(services), verifier))
}

/// Assemble routes around ready-made services.
pub fn router(services: Arc<AppServices>, verifier: Arc<dyn TokenVerifier>) -> Router {
    let auth_state = middleware::AuthState { verifier };

    // Protected routes: require a valid bearer token.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
