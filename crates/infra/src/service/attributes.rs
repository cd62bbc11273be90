use chrono::Utc;
use serde::Serialize;

use catalog_core::{DomainError, DomainResult, OwnerId};
use catalog_products::attribute::normalize_attribute_name;
use catalog_products::{Attribute, AttributeId, ProductPatch, Validated, Variation, VariationId};

use super::CatalogService;
use crate::owner_store::OwnerStore;
use crate::scope_lock::ScopeKey;

const ATTRIBUTE_SCOPE: &str = "attributes";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeInput {
    pub name: String,
    pub description: Option<String>,
    pub variations: Vec<String>,
}

/// `variations: Some(_)` replaces the attribute's variations wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub variations: Option<Vec<String>>,
}

/// An attribute with its variations, sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeDetail {
    #[serde(flatten)]
    pub attribute: Attribute,
    pub variations: Vec<Variation>,
}

impl CatalogService {
    fn attribute_detail(&self, owner: OwnerId, attribute: Attribute) -> AttributeDetail {
        let mut variations: Vec<Variation> = self
            .variations
            .list(owner)
            .into_iter()
            .filter(|v| v.attribute == attribute.id)
            .collect();
        variations.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        AttributeDetail { attribute, variations }
    }

    /// Run `f` under the owner's attribute registry lock.
    pub(super) fn with_attributes<R>(&self, owner: OwnerId, f: impl FnOnce() -> R) -> R {
        self.locks.with(ScopeKey::new(ATTRIBUTE_SCOPE, owner), f)
    }

    fn name_taken(&self, owner: OwnerId, name: &str, except: Option<AttributeId>) -> bool {
        self.attributes
            .list(owner)
            .iter()
            .any(|a| Some(a.id) != except && a.name == name)
    }

    fn new_variations(
        owner: OwnerId,
        attribute: AttributeId,
        names: &[String],
    ) -> DomainResult<Vec<Validated<Variation>>> {
        let now = Utc::now();
        names
            .iter()
            .map(|name| Variation::create(VariationId::new(), owner, attribute, name, now))
            .collect()
    }

    /// Get-or-create attributes by name. All names are validated before any
    /// attribute is created.
    pub(super) fn resolve_attributes(
        &self,
        owner: OwnerId,
        names: &[String],
    ) -> DomainResult<Vec<AttributeId>> {
        let mut normalized: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            let name = normalize_attribute_name(name)?;
            if !normalized.contains(&name) {
                normalized.push(name);
            }
        }

        self.locks.with(ScopeKey::new(ATTRIBUTE_SCOPE, owner), || {
            let existing = self.attributes.list(owner);
            let mut ids = Vec::with_capacity(normalized.len());
            for name in &normalized {
                match existing.iter().find(|a| &a.name == name) {
                    Some(found) => ids.push(found.id),
                    None => {
                        let created = Attribute::create(AttributeId::new(), owner, name, None, Utc::now())?;
                        let created = self.attributes.save(owner, created);
                        tracing::debug!(%owner, attribute = %created.id, name = %created.name, "attribute created on first use");
                        ids.push(created.id);
                    }
                }
            }
            Ok(ids)
        })
    }

    pub fn create_attribute(&self, owner: OwnerId, input: AttributeInput) -> DomainResult<AttributeDetail> {
        let detail = self.locks.with(ScopeKey::new(ATTRIBUTE_SCOPE, owner), || -> DomainResult<_> {
            let attribute = Attribute::create(
                AttributeId::new(),
                owner,
                &input.name,
                input.description.as_deref(),
                Utc::now(),
            )?;
            if self.name_taken(owner, &attribute.name, None) {
                return Err(DomainError::conflict(format!(
                    "attribute '{}' already exists",
                    attribute.name
                )));
            }
            let variations = Self::new_variations(owner, attribute.id, &input.variations)?;

            let attribute = self.attributes.save(owner, attribute);
            for variation in variations {
                self.variations.save(owner, variation);
            }
            Ok(self.attribute_detail(owner, attribute))
        })?;
        tracing::debug!(
            %owner,
            attribute = %detail.attribute.id,
            variations = detail.variations.len(),
            "attribute created"
        );
        Ok(detail)
    }

    pub fn get_attribute(&self, owner: OwnerId, id: AttributeId) -> DomainResult<AttributeDetail> {
        let attribute = self.attributes.get(owner, &id).ok_or(DomainError::NotFound)?;
        Ok(self.attribute_detail(owner, attribute))
    }

    pub fn list_attributes(&self, owner: OwnerId) -> Vec<AttributeDetail> {
        let mut attributes = self.attributes.list(owner);
        attributes.sort_by(|a, b| a.name.cmp(&b.name));
        attributes
            .into_iter()
            .map(|a| self.attribute_detail(owner, a))
            .collect()
    }

    pub fn update_attribute(
        &self,
        owner: OwnerId,
        id: AttributeId,
        patch: AttributePatch,
    ) -> DomainResult<AttributeDetail> {
        self.locks.with(ScopeKey::new(ATTRIBUTE_SCOPE, owner), || {
            let current = self.attributes.get(owner, &id).ok_or(DomainError::NotFound)?;
            let next = current.patched(patch.name.as_deref(), patch.description.as_deref())?;
            if self.name_taken(owner, &next.name, Some(id)) {
                return Err(DomainError::conflict(format!("attribute '{}' already exists", next.name)));
            }
            let replacement = match &patch.variations {
                Some(names) => Some(Self::new_variations(owner, id, names)?),
                None => None,
            };

            let attribute = self.attributes.save(owner, next);
            if let Some(replacement) = replacement {
                self.drop_variations_of(owner, id);
                for variation in replacement {
                    self.variations.save(owner, variation);
                }
            }
            tracing::debug!(%owner, attribute = %id, "attribute updated");
            Ok(self.attribute_detail(owner, attribute))
        })
    }

    /// Delete an attribute with its variations and their product line links.
    /// Categories and products stop referencing it.
    pub fn delete_attribute(&self, owner: OwnerId, id: AttributeId) -> DomainResult<()> {
        self.locks.with(ScopeKey::new(ATTRIBUTE_SCOPE, owner), || {
            self.attributes.remove(owner, &id).ok_or(DomainError::NotFound)?;
            self.drop_variations_of(owner, id);
            Ok::<(), DomainError>(())
        })?;

        self.forget_category_attribute(owner, id)?;
        let cleared = self.rewrite_products(owner, |product| {
            product.attributes.contains(&id).then(|| ProductPatch {
                attributes: Some(product.attributes.iter().copied().filter(|a| *a != id).collect()),
                ..Default::default()
            })
        })?;
        tracing::debug!(%owner, attribute = %id, products_cleared = cleared, "attribute deleted");
        Ok(())
    }

    fn drop_variations_of(&self, owner: OwnerId, attribute: AttributeId) {
        let removed = self.variations.remove_where(owner, &|v| v.attribute == attribute);
        let unlinked = self.drop_links(owner, |link| removed.iter().any(|v| v.id == link.variation));
        tracing::debug!(%owner, %attribute, variations = removed.len(), links = unlinked, "variations dropped");
    }

    pub(super) fn variation(&self, owner: OwnerId, id: VariationId) -> DomainResult<Variation> {
        self.variations
            .get(owner, &id)
            .ok_or_else(|| DomainError::unresolved("variation", id))
    }
}
