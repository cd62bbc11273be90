use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;

use catalog_auth::{Hs256JwtIssuer, UserId};
use catalog_core::DomainError;
use catalog_infra::UserDirectory;

use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub type Users = Arc<UserDirectory>;
pub type Issuer = Arc<Hs256JwtIssuer>;

/// Registration and sign-in; reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/token", post(issue_token))
}

pub async fn create_user(
    Extension(users): Extension<Users>,
    Json(body): Json<dto::CreateUserRequest>,
) -> axum::response::Response {
    errors::respond(StatusCode::CREATED, users.register(body.into()))
}

pub async fn issue_token(
    Extension(users): Extension<Users>,
    Extension(issuer): Extension<Issuer>,
    Json(body): Json<dto::TokenRequest>,
) -> axum::response::Response {
    let user = match users.authenticate(&body.email, &body.password) {
        Ok(user) => user,
        Err(DomainError::Unauthorized) => {
            return errors::json_error(
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "unable to authenticate with provided credentials",
            );
        }
        Err(e) => return errors::domain_error_to_response(e),
    };
    match issuer.issue(user.principal_id(), user.roles(), Utc::now()) {
        Ok(token) => (StatusCode::OK, Json(token)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, user = %user.id, "token issuing failed");
            errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "token_error", "could not issue token")
        }
    }
}

fn own_id(principal: &PrincipalContext) -> UserId {
    UserId::from(principal.principal_id())
}

pub async fn me(
    Extension(users): Extension<Users>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    errors::respond(StatusCode::OK, users.get(own_id(&principal)))
}

pub async fn update_me(
    Extension(users): Extension<Users>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::UpdateUserRequest>,
) -> axum::response::Response {
    errors::respond(StatusCode::OK, users.update(own_id(&principal), body.into()))
}

pub async fn delete_me(
    Extension(users): Extension<Users>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match users.delete(own_id(&principal)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
