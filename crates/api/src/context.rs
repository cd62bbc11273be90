use catalog_auth::{PrincipalId, Role};
use catalog_core::OwnerId;

/// Principal context for a request (authenticated identity + roles).
///
/// Inserted by the auth middleware; every catalog row the request touches is
/// scoped to [`PrincipalContext::owner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal_id: PrincipalId,
    roles: Vec<Role>,
}

impl PrincipalContext {
    pub fn new(principal_id: PrincipalId, roles: Vec<Role>) -> Self {
        Self { principal_id, roles }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn owner(&self) -> OwnerId {
        self.principal_id.owner_id()
    }
}
