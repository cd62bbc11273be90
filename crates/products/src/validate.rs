//! Field validation helpers shared by every catalog entity, plus the
//! [`Validated`] token that gates persistence.

use catalog_core::{DomainError, DomainResult};

/// Maximum length of brand and category names.
pub const SHORT_NAME_MAX: usize = 210;

/// Maximum length of product names, SKUs and alt texts.
pub const LONG_NAME_MAX: usize = 255;

/// Trim `value` and reject it if nothing is left.
pub fn require_non_empty(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

/// Reject `value` if it is longer than `max` characters.
pub fn require_max_len(field: &str, value: &str, max: usize) -> DomainResult<()> {
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// A trimmed, non-empty name no longer than `max`.
pub fn normalize_name(field: &str, value: &str, max: usize) -> DomainResult<String> {
    let name = require_non_empty(field, value)?;
    require_max_len(field, &name, max)?;
    Ok(name)
}

/// A value that has passed its entity's full validation and may be persisted.
///
/// Only this crate can construct one, so a store write is always preceded by
/// the entity's validation routine (on creation and on every update).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated<T>(T);

impl<T> Validated<T> {
    pub(crate) fn new(value: T) -> Self {
        Self(value)
    }

    pub fn get(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> core::ops::Deref for Validated<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}
