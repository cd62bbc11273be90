//! Attributes (named axes such as "color"), their variations ("red") and the
//! association of variations with product lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{DomainResult, Entity, OwnerId};

use crate::product_line::ProductLineId;
use crate::validate::{self, LONG_NAME_MAX, Validated};

catalog_core::uuid_newtype!(
    /// Attribute identifier.
    pub struct AttributeId,
    "AttributeId"
);

catalog_core::uuid_newtype!(
    /// Variation identifier.
    pub struct VariationId,
    "VariationId"
);

/// An attribute row. Names are stored lowercased and are unique per owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: AttributeId,
    pub owner: OwnerId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for Attribute {
    type Id = AttributeId;
    const KIND: &'static str = "attribute";

    fn id(&self) -> &AttributeId {
        &self.id
    }
}

/// A concrete value of one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    pub id: VariationId,
    pub owner: OwnerId,
    pub attribute: AttributeId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for Variation {
    type Id = VariationId;
    const KIND: &'static str = "variation";

    fn id(&self) -> &VariationId {
        &self.id
    }
}

/// Link between a variation and a product line; unique per pair.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductLineVariation {
    pub variation: VariationId,
    pub product_line: ProductLineId,
}

/// Lowercased, trimmed attribute name.
pub fn normalize_attribute_name(name: &str) -> DomainResult<String> {
    Ok(validate::normalize_name("attribute name", name, LONG_NAME_MAX)?.to_lowercase())
}

impl Attribute {
    pub fn create(
        id: AttributeId,
        owner: OwnerId,
        name: &str,
        description: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Validated<Attribute>> {
        Ok(Validated::new(Attribute {
            id,
            owner,
            name: normalize_attribute_name(name)?,
            description: description.map(str::trim).unwrap_or_default().to_string(),
            created_at,
        }))
    }

    /// Validate a rename and/or new description.
    pub fn patched(&self, name: Option<&str>, description: Option<&str>) -> DomainResult<Validated<Attribute>> {
        let mut next = self.clone();
        if let Some(name) = name {
            next.name = normalize_attribute_name(name)?;
        }
        if let Some(description) = description {
            next.description = description.trim().to_string();
        }
        Ok(Validated::new(next))
    }
}

impl Variation {
    pub fn create(
        id: VariationId,
        owner: OwnerId,
        attribute: AttributeId,
        name: &str,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Validated<Variation>> {
        Ok(Validated::new(Variation {
            id,
            owner,
            attribute,
            name: validate::normalize_name("variation name", name, LONG_NAME_MAX)?,
            created_at,
        }))
    }
}
