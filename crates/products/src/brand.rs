use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{DomainResult, Entity, OwnerId};

use crate::slug::Slug;
use crate::validate::{self, SHORT_NAME_MAX, Validated};

catalog_core::uuid_newtype!(
    /// Brand identifier.
    pub struct BrandId,
    "BrandId"
);

/// A brand row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub owner: OwnerId,
    pub name: String,
    pub slug: Slug,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Entity for Brand {
    type Id = BrandId;
    const KIND: &'static str = "brand";

    fn id(&self) -> &BrandId {
        &self.id
    }
}

/// Field changes for an existing brand; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandPatch {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

impl Brand {
    /// Validate a new brand. `slug_taken` reports slugs already used by the owner.
    pub fn create(
        id: BrandId,
        owner: OwnerId,
        name: &str,
        is_active: bool,
        created_at: DateTime<Utc>,
        slug_taken: impl Fn(&str) -> bool,
    ) -> DomainResult<Validated<Brand>> {
        let name = validate::normalize_name("name", name, SHORT_NAME_MAX)?;
        let slug = Slug::unique_from_name(&name, id, slug_taken);
        Ok(Validated::new(Brand {
            id,
            owner,
            name,
            slug,
            is_active,
            created_at,
        }))
    }

    /// Validate `patch` applied to this brand. A rename re-derives the slug.
    pub fn patched(
        &self,
        patch: BrandPatch,
        slug_taken: impl Fn(&str) -> bool,
    ) -> DomainResult<Validated<Brand>> {
        let mut next = self.clone();
        if let Some(name) = patch.name {
            let name = validate::normalize_name("name", &name, SHORT_NAME_MAX)?;
            if name != self.name {
                next.slug = Slug::unique_from_name(&name, self.id, slug_taken);
                next.name = name;
            }
        }
        if let Some(is_active) = patch.is_active {
            next.is_active = is_active;
        }
        Ok(Validated::new(next))
    }
}
