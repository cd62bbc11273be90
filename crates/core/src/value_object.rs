//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**; two value objects with the same values
//! are the same value. In the catalog these are things like slugs and ordering
//! positions, which are validated once at construction and never mutated.

/// Marker trait for value objects.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Slug(String);
///
/// impl ValueObject for Slug {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
