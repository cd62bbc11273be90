//! Strongly-typed identifiers used across the domain.

/// Re-exported so [`uuid_newtype!`](crate::uuid_newtype) expands in downstream crates.
pub use uuid;

/// Declare a `Copy` UUID newtype with constructors, `Display`, `FromStr` and
/// conversions to/from [`uuid::Uuid`].
///
/// The calling crate must depend on `serde` (the type derives its traits).
#[macro_export]
macro_rules! uuid_newtype {
    ($(#[$meta:meta])* $vis:vis struct $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        $vis struct $t($crate::id::uuid::Uuid);

        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn new() -> Self {
                Self($crate::id::uuid::Uuid::now_v7())
            }

            pub fn from_uuid(uuid: $crate::id::uuid::Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &$crate::id::uuid::Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$crate::id::uuid::Uuid> for $t {
            fn from(value: $crate::id::uuid::Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for $crate::id::uuid::Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl core::str::FromStr for $t {
            type Err = $crate::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = <$crate::id::uuid::Uuid as core::str::FromStr>::from_str(s)
                    .map_err(|e| $crate::DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

uuid_newtype!(
    /// Identifier of the principal that owns a catalog row.
    pub struct OwnerId,
    "OwnerId"
);

uuid_newtype!(
    /// Untyped row identifier, used where a scope value can be any parent kind.
    pub struct EntityId,
    "EntityId"
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DomainError;

    #[test]
    fn parse_rejects_malformed_uuid() {
        let err = "not-a-uuid".parse::<OwnerId>().unwrap_err();
        match err {
            DomainError::InvalidId(msg) => assert!(msg.starts_with("OwnerId:")),
            other => panic!("expected InvalidId, got {other:?}"),
        }
    }

    #[test]
    fn display_round_trips_through_from_str() {
        let id = EntityId::new();
        let parsed: EntityId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn serializes_as_bare_uuid_string() {
        let id = OwnerId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_string()));
    }
}
