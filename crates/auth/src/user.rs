//! User accounts.
//!
//! A user's id doubles as the principal id its tokens carry, so every catalog
//! row a signed-in user writes is owned by that user.

use chrono::{DateTime, Utc};
use serde::Serialize;

use catalog_core::{DomainError, DomainResult, Entity};

use crate::password::PasswordHash;
use crate::{PrincipalId, Role};

catalog_core::uuid_newtype!(
    /// User account identifier.
    pub struct UserId,
    "UserId"
);

impl From<PrincipalId> for UserId {
    fn from(value: PrincipalId) -> Self {
        Self::from_uuid(*value.as_uuid())
    }
}

pub const EMAIL_MAX: usize = 255;
pub const NAME_MAX: usize = 255;

/// A registered user. Serializes without its password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    /// Staff users sign in with the `admin` role.
    pub is_staff: bool,
    #[serde(skip)]
    pub password: PasswordHash,
    pub created_at: DateTime<Utc>,
}

impl Entity for User {
    type Id = UserId;
    const KIND: &'static str = "user";

    fn id(&self) -> &UserId {
        &self.id
    }
}

/// Input for [`User::create`]. Without a name the email's local part is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub password: String,
}

/// Changes to an existing user; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Trim and lowercase the domain part; the local part keeps its case.
pub fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(DomainError::validation("users must have an email address"));
    }
    let (local, domain) = email
        .rsplit_once('@')
        .filter(|(local, domain)| !local.is_empty() && !domain.is_empty())
        .ok_or_else(|| DomainError::validation(format!("'{email}' is not an email address")))?;
    let normalized = format!("{local}@{}", domain.to_lowercase());
    if normalized.chars().count() > EMAIL_MAX {
        return Err(DomainError::validation(format!(
            "email must be at most {EMAIL_MAX} characters"
        )));
    }
    Ok(normalized)
}

fn display_name(name: Option<&str>, email: &str) -> DomainResult<String> {
    let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => email.split('@').next().unwrap_or_default().to_string(),
    };
    if name.chars().count() > NAME_MAX {
        return Err(DomainError::validation(format!(
            "name must be at most {NAME_MAX} characters"
        )));
    }
    Ok(name)
}

impl User {
    pub fn create(
        id: UserId,
        new: NewUser,
        is_staff: bool,
        created_at: DateTime<Utc>,
    ) -> DomainResult<User> {
        let email = normalize_email(&new.email)?;
        let name = display_name(new.name.as_deref(), &email)?;
        let password = PasswordHash::new(&new.password)?;
        Ok(User {
            id,
            email,
            name,
            is_active: true,
            is_staff,
            password,
            created_at,
        })
    }

    /// Validate `patch` applied to this user. A new password is re-hashed.
    pub fn patched(&self, patch: UserPatch) -> DomainResult<User> {
        let mut next = self.clone();
        if let Some(email) = patch.email {
            next.email = normalize_email(&email)?;
        }
        if let Some(name) = patch.name {
            next.name = display_name(Some(&name), &next.email)?;
        }
        if let Some(password) = patch.password {
            next.password = PasswordHash::new(&password)?;
        }
        Ok(next)
    }

    pub fn principal_id(&self) -> PrincipalId {
        PrincipalId::from_uuid(*self.id.as_uuid())
    }

    pub fn roles(&self) -> Vec<Role> {
        if self.is_staff {
            vec![Role::new(Role::ADMIN)]
        } else {
            vec![Role::new(Role::EDITOR)]
        }
    }
}
