use thiserror::Error;

use crate::{JwtClaims, Permission, PrincipalId, Role, permissions_for_roles};

/// A fully resolved principal for authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub principal_id: PrincipalId,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
}

impl Principal {
    /// Resolve a principal from verified claims using the static role policy.
    pub fn from_claims(claims: &JwtClaims) -> Self {
        Self {
            principal_id: claims.sub,
            roles: claims.roles.clone(),
            permissions: permissions_for_roles(&claims.roles),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Pure policy check: the principal holds `required` or the wildcard.
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    let granted = principal
        .permissions
        .iter()
        .any(|p| p.is_wildcard() || p == required);
    if granted {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn principal(roles: &[&'static str]) -> Principal {
        let now = Utc::now();
        Principal::from_claims(&JwtClaims {
            sub: PrincipalId::new(),
            roles: roles.iter().map(|r| Role::new(*r)).collect(),
            issued_at: now,
            expires_at: now + Duration::hours(1),
        })
    }

    #[test]
    fn viewer_reads_but_cannot_write() {
        let viewer = principal(&["viewer"]);
        assert!(authorize(&viewer, &Permission::new(Permission::CATALOG_READ)).is_ok());
        assert_eq!(
            authorize(&viewer, &Permission::new(Permission::CATALOG_WRITE)),
            Err(AuthzError::Forbidden("catalog.write".to_string()))
        );
    }

    #[test]
    fn admin_wildcard_grants_anything() {
        let admin = principal(&["admin"]);
        assert!(authorize(&admin, &Permission::new("anything.at.all")).is_ok());
    }

    #[test]
    fn no_roles_means_no_access() {
        let nobody = principal(&[]);
        assert!(authorize(&nobody, &Permission::new(Permission::CATALOG_READ)).is_err());
    }
}
