use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{DomainResult, Entity, OwnerId};

use crate::attribute::AttributeId;
use crate::brand::BrandId;
use crate::category::CategoryId;
use crate::slug::Slug;
use crate::validate::{self, LONG_NAME_MAX, Validated};

catalog_core::uuid_newtype!(
    /// Product identifier.
    pub struct ProductId,
    "ProductId"
);

/// A product row. The slug is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub owner: OwnerId,
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub brand: Option<BrandId>,
    pub category: Option<CategoryId>,
    pub attributes: Vec<AttributeId>,
    pub is_digital: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Entity for Product {
    type Id = ProductId;
    const KIND: &'static str = "product";

    fn id(&self) -> &ProductId {
        &self.id
    }
}

/// Input for [`Product::create`]. Brand and category must already be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub brand: Option<BrandId>,
    pub category: Option<CategoryId>,
    pub attributes: Vec<AttributeId>,
    pub is_digital: bool,
    pub is_active: bool,
}

/// Field changes for an existing product; `None` leaves a field as is.
///
/// `brand`/`category` use a nested option: `Some(None)` clears the reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<Option<BrandId>>,
    pub category: Option<Option<CategoryId>>,
    pub attributes: Option<Vec<AttributeId>>,
    pub is_digital: Option<bool>,
    pub is_active: Option<bool>,
}

impl Product {
    /// Validate a new product and derive its slug.
    pub fn create(
        id: ProductId,
        owner: OwnerId,
        new: NewProduct,
        created_at: DateTime<Utc>,
        slug_taken: impl Fn(&str) -> bool,
    ) -> DomainResult<Validated<Product>> {
        let name = validate::normalize_name("name", &new.name, LONG_NAME_MAX)?;
        let slug = Slug::for_product(&name, created_at, slug_taken);
        Ok(Validated::new(Product {
            id,
            owner,
            name,
            slug,
            description: new.description.trim().to_string(),
            brand: new.brand,
            category: new.category,
            attributes: dedup_preserving_order(new.attributes),
            is_digital: new.is_digital,
            is_active: new.is_active,
            created_at,
        }))
    }

    /// Validate `patch` applied to this product. Id, owner, slug and creation
    /// time never change.
    pub fn patched(&self, patch: ProductPatch) -> DomainResult<Validated<Product>> {
        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = validate::normalize_name("name", &name, LONG_NAME_MAX)?;
        }
        if let Some(description) = patch.description {
            next.description = description.trim().to_string();
        }
        if let Some(brand) = patch.brand {
            next.brand = brand;
        }
        if let Some(category) = patch.category {
            next.category = category;
        }
        if let Some(attributes) = patch.attributes {
            next.attributes = dedup_preserving_order(attributes);
        }
        if let Some(is_digital) = patch.is_digital {
            next.is_digital = is_digital;
        }
        if let Some(is_active) = patch.is_active {
            next.is_active = is_active;
        }
        Ok(Validated::new(next))
    }
}

fn dedup_preserving_order<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
