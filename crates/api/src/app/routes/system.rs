use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use catalog_auth::permissions_for_roles;

use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "principal_id": principal.principal_id().to_string(),
        "roles": principal.roles().iter().map(|r| r.as_str()).collect::<Vec<_>>(),
        "permissions": permissions_for_roles(principal.roles())
            .iter()
            .map(|p| p.as_str().to_string())
            .collect::<Vec<_>>(),
    }))
}
