use std::sync::Arc;

use axum::http::StatusCode;

use catalog_auth::Permission;
use catalog_infra::CatalogService;

use crate::app::errors;
use crate::context::PrincipalContext;

pub type Services = Arc<CatalogService>;

/// Reject the request with 403 unless the principal holds `required`.
pub fn guard(principal: &PrincipalContext, required: &'static str) -> Result<(), axum::response::Response> {
    crate::authz::authorize_request(principal, required)
        .map_err(|e| errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()))
}

pub fn read(principal: &PrincipalContext) -> Result<(), axum::response::Response> {
    guard(principal, Permission::CATALOG_READ)
}

pub fn write(principal: &PrincipalContext) -> Result<(), axum::response::Response> {
    guard(principal, Permission::CATALOG_WRITE)
}
