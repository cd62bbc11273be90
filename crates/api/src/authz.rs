//! API-side authorization guard.
//!
//! Handlers check the permission a route needs before calling the service,
//! keeping the catalog service itself auth-agnostic.

use catalog_auth::{AuthzError, Permission, Principal, authorize, permissions_for_roles};

use crate::context::PrincipalContext;

/// Check that the request's principal holds `required`.
pub fn authorize_request(principal: &PrincipalContext, required: &'static str) -> Result<(), AuthzError> {
    let principal = Principal {
        principal_id: principal.principal_id(),
        roles: principal.roles().to_vec(),
        permissions: permissions_for_roles(principal.roles()),
    };
    authorize(&principal, &Permission::new(required))
}
