//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts). Every rejected precondition maps to exactly one
/// variant; infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A conflict occurred (e.g. a uniqueness rule on a non-ordering field).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Authorization failure at the domain boundary.
    #[error("unauthorized")]
    Unauthorized,

    /// An ordering-bearing entity type was registered with a scope field it
    /// does not declare. Configuration error, raised at startup.
    #[error("{entity} has no reference field named '{field}' to scope its ordering")]
    MissingScopeField { entity: &'static str, field: String },

    /// An ordering value collides with a sibling under the same scope.
    #[error("ordering {ordering} is already taken within {scope_field} {scope}")]
    DuplicateOrdering {
        ordering: u32,
        scope_field: &'static str,
        scope: String,
    },

    /// Reparenting would make a category its own ancestor.
    #[error("cannot move category {node} under {parent}: it would become its own ancestor")]
    CyclicParent { node: String, parent: String },

    /// The parent/scope row a write refers to does not exist.
    #[error("{kind} {reference} does not exist")]
    UnresolvedScopeReference { kind: &'static str, reference: String },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn unresolved(kind: &'static str, reference: impl core::fmt::Display) -> Self {
        Self::UnresolvedScopeReference {
            kind,
            reference: reference.to_string(),
        }
    }

    /// Whether a caller may reasonably retry the write (possibly with different input).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::MissingScopeField { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_ordering_message_names_value_and_scope() {
        let err = DomainError::DuplicateOrdering {
            ordering: 3,
            scope_field: "product",
            scope: "p-1".to_string(),
        };
        assert_eq!(err.to_string(), "ordering 3 is already taken within product p-1");
    }

    #[test]
    fn missing_scope_field_is_not_recoverable() {
        let err = DomainError::MissingScopeField {
            entity: "product_line",
            field: "widget".to_string(),
        };
        assert!(!err.is_recoverable());
        assert!(DomainError::not_found().is_recoverable());
        assert!(DomainError::unresolved("product", "abc").is_recoverable());
    }
}
