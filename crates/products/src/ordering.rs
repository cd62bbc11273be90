//! Per-scope ordering positions.
//!
//! Product lines are ordered within their product and images within their
//! product line. An [`OrderAssigner`] is built once per entity type (naming the
//! reference field that defines the scope) and is then run on every save:
//!
//! - no ordering supplied: `1 + max(sibling orderings)`, or `1` for the first row
//! - ordering supplied: rejected with [`DomainError::DuplicateOrdering`] if a
//!   sibling already holds it
//!
//! Only rows sharing the candidate's scope value count as siblings. Gaps are
//! allowed and deletes never renumber.

use core::marker::PhantomData;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, DomainResult, Entity, EntityId, ValueObject};

/// A strictly positive ordering position.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct OrderNumber(NonZeroU32);

impl ValueObject for OrderNumber {}

impl OrderNumber {
    pub const FIRST: OrderNumber = OrderNumber(NonZeroU32::MIN);

    pub fn new(value: u32) -> DomainResult<Self> {
        NonZeroU32::new(value)
            .map(Self)
            .ok_or_else(|| DomainError::validation("ordering must be a positive integer"))
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// The position right after this one.
    pub fn next(self) -> DomainResult<Self> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or_else(|| DomainError::validation("ordering exceeds the maximum position"))
    }
}

impl TryFrom<u32> for OrderNumber {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OrderNumber> for u32 {
    fn from(value: OrderNumber) -> Self {
        value.get()
    }
}

impl core::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// An entity type that carries an ordering position scoped to a parent reference.
pub trait Ordered: Entity {
    /// Names of the reference fields declared on this type.
    const REFERENCE_FIELDS: &'static [&'static str];

    /// Value of the named reference field, if the row has one.
    fn reference(&self, field: &str) -> Option<EntityId>;

    fn ordering(&self) -> Option<OrderNumber>;

    fn set_ordering(&mut self, ordering: OrderNumber);
}

/// Assigns and validates ordering positions for one entity type within one scope field.
#[derive(Debug)]
pub struct OrderAssigner<E> {
    scope_field: &'static str,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for OrderAssigner<E> {
    fn clone(&self) -> Self {
        Self {
            scope_field: self.scope_field,
            _entity: PhantomData,
        }
    }
}

impl<E: Ordered> OrderAssigner<E> {
    /// Register ordering for `E`, scoped by `scope_field`.
    ///
    /// Fails with [`DomainError::MissingScopeField`] if `E` declares no such
    /// reference field. Call this once at startup.
    pub fn new(scope_field: &'static str) -> DomainResult<Self> {
        if !E::REFERENCE_FIELDS.contains(&scope_field) {
            return Err(DomainError::MissingScopeField {
                entity: E::KIND,
                field: scope_field.to_string(),
            });
        }
        Ok(Self {
            scope_field,
            _entity: PhantomData,
        })
    }

    pub fn scope_field(&self) -> &'static str {
        self.scope_field
    }

    /// Scope value of `entity`.
    pub fn scope_of(&self, entity: &E) -> DomainResult<EntityId> {
        entity.reference(self.scope_field).ok_or_else(|| {
            DomainError::unresolved(self.scope_field, format!("(unset on {})", E::KIND))
        })
    }

    /// Populate or confirm `candidate`'s ordering against `rows`.
    ///
    /// `rows` may contain rows from other scopes and the candidate's own stored
    /// row; both are skipped.
    pub fn assign_or_validate<'a, I>(&self, candidate: &mut E, rows: I) -> DomainResult<OrderNumber>
    where
        I: IntoIterator<Item = &'a E>,
        E: 'a,
    {
        let scope = self.scope_of(candidate)?;
        let id = candidate.id().clone();
        let siblings = rows
            .into_iter()
            .filter(|row| row.id() != &id && row.reference(self.scope_field) == Some(scope))
            .filter_map(|row| row.ordering());

        let ordering = match candidate.ordering() {
            Some(wanted) => {
                if siblings.into_iter().any(|taken| taken == wanted) {
                    return Err(DomainError::DuplicateOrdering {
                        ordering: wanted.get(),
                        scope_field: self.scope_field,
                        scope: scope.to_string(),
                    });
                }
                wanted
            }
            None => match siblings.max() {
                Some(last) => last.next()?,
                None => OrderNumber::FIRST,
            },
        };

        candidate.set_ordering(ordering);
        tracing::trace!(
            entity = E::KIND,
            scope_field = self.scope_field,
            %scope,
            ordering = ordering.get(),
            "ordering settled"
        );
        Ok(ordering)
    }
}
