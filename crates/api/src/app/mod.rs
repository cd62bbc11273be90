//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `routes/`: HTTP routes + handlers (one file per catalog area)
//! - `dto.rs`: request DTOs and their mapping onto service inputs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use catalog_auth::{Hs256JwtIssuer, Hs256JwtValidator, NewUser};
use catalog_core::DomainResult;
use catalog_infra::{CatalogService, UserDirectory};

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Fails if the catalog's ordering registration is misconfigured or the
/// configured admin account is invalid.
pub fn build_app(config: &ApiConfig) -> DomainResult<Router> {
    let jwt = Arc::new(Hs256JwtValidator::new(&config.jwt_secret));
    let auth_state = middleware::AuthState { jwt };
    let issuer = Arc::new(Hs256JwtIssuer::new(&config.jwt_secret, config.token_ttl));

    let services = Arc::new(CatalogService::new()?);

    let users = Arc::new(UserDirectory::new());
    if let Some(admin) = &config.admin {
        let user = users.create_superuser(NewUser {
            email: admin.email.clone(),
            name: None,
            password: admin.password.clone(),
        })?;
        tracing::info!(user = %user.id, email = %user.email, "admin account created");
    }

    // Protected routes: require a valid bearer token.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::users::public_router())
        .merge(protected)
        .layer(Extension(users))
        .layer(Extension(issuer))
        .layer(ServiceBuilder::new()))
}
