//! URL slugs for products, brands and categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use uuid::Uuid;

use catalog_core::{DomainError, DomainResult, ValueObject};

const FALLBACK_STEM_LEN: usize = 8;

/// A lowercase, hyphen-separated URL identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl ValueObject for Slug {}

impl Slug {
    /// Parse an existing slug (e.g. from a URL path).
    pub fn parse(value: &str) -> DomainResult<Self> {
        if value.is_empty() || slugify(value) != value {
            return Err(DomainError::validation(format!("'{value}' is not a valid slug")));
        }
        Ok(Self(value.to_string()))
    }

    /// `slugify(name)`, made unique against `taken`.
    ///
    /// A name with no ASCII alphanumerics (e.g. "Обувь") falls back to a stem
    /// taken from the random tail of `id`.
    pub fn unique_from_name(
        name: &str,
        id: impl Into<Uuid>,
        taken: impl Fn(&str) -> bool,
    ) -> Self {
        let mut base = slugify(name);
        if base.is_empty() {
            let hex = id.into().simple().to_string();
            base = hex[hex.len() - FALLBACK_STEM_LEN..].to_string();
        }
        Self(dedupe(base, taken))
    }

    /// Product slug: `slugify(name)-<created_at millis>`, made unique against `taken`.
    ///
    /// The timestamp alone does not guarantee uniqueness (two products with the
    /// same name can share a millisecond), so collisions get a numeric suffix.
    pub fn for_product(
        name: &str,
        created_at: DateTime<Utc>,
        taken: impl Fn(&str) -> bool,
    ) -> Self {
        let stem = slugify(name);
        let base = if stem.is_empty() {
            created_at.timestamp_millis().to_string()
        } else {
            format!("{stem}-{}", created_at.timestamp_millis())
        };
        Self(dedupe(base, taken))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Slug {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercase ASCII alphanumerics; every other run of characters collapses to
/// one `-`; no leading or trailing `-`.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

fn dedupe(base: String, taken: impl Fn(&str) -> bool) -> String {
    if !taken(&base) {
        return base;
    }
    (2u64..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or(base)
}
