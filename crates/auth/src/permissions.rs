use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "catalog.read").
/// The wildcard permission `"*"` grants everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const CATALOG_READ: &'static str = "catalog.read";
    pub const CATALOG_WRITE: &'static str = "catalog.write";

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static role → permission policy.
///
/// `admin` grants everything, `editor` reads and writes the catalog, `viewer`
/// only reads it. Unknown roles grant nothing.
pub fn permissions_for_roles(roles: &[Role]) -> Vec<Permission> {
    let mut perms: Vec<Permission> = Vec::new();
    for role in roles {
        let granted: &[&'static str] = match role.as_str() {
            Role::ADMIN => &["*"],
            Role::EDITOR => &[Permission::CATALOG_READ, Permission::CATALOG_WRITE],
            Role::VIEWER => &[Permission::CATALOG_READ],
            _ => &[],
        };
        for name in granted {
            let perm = Permission::new(*name);
            if !perms.contains(&perm) {
                perms.push(perm);
            }
        }
    }
    perms
}
