//! Registered user accounts, keyed by id with unique emails.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use catalog_auth::{NewUser, User, UserId, UserPatch, normalize_email};
use catalog_core::{DomainError, DomainResult};

#[derive(Debug, Default)]
pub struct UserDirectory {
    users: RwLock<HashMap<UserId, User>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<UserId, User>> {
        self.users.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<UserId, User>> {
        self.users.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a regular user.
    pub fn register(&self, new: NewUser) -> DomainResult<User> {
        self.insert(new, false)
    }

    /// Register a staff user (signs in with the `admin` role).
    pub fn create_superuser(&self, new: NewUser) -> DomainResult<User> {
        self.insert(new, true)
    }

    fn insert(&self, new: NewUser, is_staff: bool) -> DomainResult<User> {
        let user = User::create(UserId::new(), new, is_staff, Utc::now())?;
        {
            let mut users = self.write();
            if users.values().any(|u| u.email == user.email) {
                return Err(email_taken(&user.email));
            }
            users.insert(user.id, user.clone());
        }
        tracing::debug!(user = %user.id, is_staff, "user registered");
        Ok(user)
    }

    pub fn get(&self, id: UserId) -> DomainResult<User> {
        self.read().get(&id).cloned().ok_or(DomainError::NotFound)
    }

    /// The active user with `email` and `password`. Every mismatch is the
    /// same `Unauthorized`.
    pub fn authenticate(&self, email: &str, password: &str) -> DomainResult<User> {
        let email = normalize_email(email).map_err(|_| DomainError::Unauthorized)?;
        let user = self.read().values().find(|u| u.email == email).cloned();
        match user {
            Some(user) if user.is_active && user.password.verify(password) => Ok(user),
            _ => {
                tracing::debug!("authentication failed");
                Err(DomainError::Unauthorized)
            }
        }
    }

    pub fn update(&self, id: UserId, patch: UserPatch) -> DomainResult<User> {
        let mut users = self.write();
        let current = users.get(&id).ok_or(DomainError::NotFound)?;
        let next = current.patched(patch)?;
        if users.values().any(|u| u.id != id && u.email == next.email) {
            return Err(email_taken(&next.email));
        }
        users.insert(id, next.clone());
        tracing::debug!(user = %id, "user updated");
        Ok(next)
    }

    pub fn delete(&self, id: UserId) -> DomainResult<User> {
        let user = self.write().remove(&id).ok_or(DomainError::NotFound)?;
        tracing::debug!(user = %id, "user deleted");
        Ok(user)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn email_taken(email: &str) -> DomainError {
    DomainError::conflict(format!("a user with email '{email}' already exists"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, password: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: None,
            password: password.to_string(),
        }
    }

    #[test]
    fn duplicate_email_conflicts_after_normalization() {
        let users = UserDirectory::new();
        users.register(new_user("abc@example.com", "test_pass123")).unwrap();
        let err = users.register(new_user("abc@EXAMPLE.com", "test_pass123")).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(users.len(), 1);
    }

    #[test]
    fn short_password_registers_nothing() {
        let users = UserDirectory::new();
        let err = users.register(new_user("test_test@example.com", "123a")).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(users.is_empty());
    }

    #[test]
    fn authenticate_checks_email_and_password() {
        let users = UserDirectory::new();
        let user = users.register(new_user("test@Example.com", "test_pass123")).unwrap();
        assert_eq!(users.authenticate("test@EXAMPLE.COM", "test_pass123").unwrap().id, user.id);
        assert_eq!(users.authenticate("test@example.com", "wrong_pass"), Err(DomainError::Unauthorized));
        assert_eq!(users.authenticate("nobody@example.com", "test_pass123"), Err(DomainError::Unauthorized));
        assert_eq!(users.authenticate("not-an-email", "test_pass123"), Err(DomainError::Unauthorized));
    }

    #[test]
    fn superuser_is_staff() {
        let users = UserDirectory::new();
        let admin = users.create_superuser(new_user("root@example.com", "root_pass_1")).unwrap();
        assert!(admin.is_staff);
        assert_eq!(admin.name, "root");
    }

    #[test]
    fn update_keeps_emails_unique_and_changes_password() {
        let users = UserDirectory::new();
        users.register(new_user("a@example.com", "test_pass123")).unwrap();
        let b = users.register(new_user("b@example.com", "test_pass123")).unwrap();

        let err = users
            .update(b.id, UserPatch { email: Some("a@example.com".into()), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        users
            .update(b.id, UserPatch { password: Some("brand_new_pw".into()), ..Default::default() })
            .unwrap();
        assert!(users.authenticate("b@example.com", "brand_new_pw").is_ok());
        assert!(users.authenticate("b@example.com", "test_pass123").is_err());
    }

    #[test]
    fn deleted_user_cannot_sign_in() {
        let users = UserDirectory::new();
        let user = users.register(new_user("gone@example.com", "test_pass123")).unwrap();
        users.delete(user.id).unwrap();
        assert_eq!(users.get(user.id), Err(DomainError::NotFound));
        assert_eq!(users.authenticate("gone@example.com", "test_pass123"), Err(DomainError::Unauthorized));
        assert_eq!(users.delete(user.id), Err(DomainError::NotFound));
    }
}
