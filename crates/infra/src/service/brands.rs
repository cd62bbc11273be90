use chrono::Utc;

use catalog_core::{DomainError, DomainResult, OwnerId};
use catalog_products::{Brand, BrandId, BrandPatch, ProductPatch};

use super::CatalogService;
use crate::owner_store::OwnerStore;
use crate::scope_lock::ScopeKey;

const BRAND_SCOPE: &str = "brands";

impl CatalogService {
    fn brand_slug_taken(&self, owner: OwnerId, slug: &str, except: Option<BrandId>) -> bool {
        self.brands
            .list(owner)
            .iter()
            .any(|b| Some(b.id) != except && b.slug.as_str() == slug)
    }

    pub fn create_brand(&self, owner: OwnerId, name: &str, is_active: bool) -> DomainResult<Brand> {
        let brand = self.locks.with(ScopeKey::new(BRAND_SCOPE, owner), || {
            let brand = Brand::create(BrandId::new(), owner, name, is_active, Utc::now(), |s| {
                self.brand_slug_taken(owner, s, None)
            })?;
            Ok::<_, DomainError>(self.brands.save(owner, brand))
        })?;
        tracing::debug!(%owner, brand = %brand.id, slug = %brand.slug, "brand created");
        Ok(brand)
    }

    pub fn get_brand(&self, owner: OwnerId, id: BrandId) -> DomainResult<Brand> {
        self.brands.get(owner, &id).ok_or(DomainError::NotFound)
    }

    pub fn list_brands(&self, owner: OwnerId) -> Vec<Brand> {
        let mut brands = self.brands.list(owner);
        brands.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        brands
    }

    pub fn update_brand(&self, owner: OwnerId, id: BrandId, patch: BrandPatch) -> DomainResult<Brand> {
        self.locks.with(ScopeKey::new(BRAND_SCOPE, owner), || {
            let current = self.get_brand(owner, id)?;
            let next = current.patched(patch, |s| self.brand_slug_taken(owner, s, Some(id)))?;
            let brand = self.brands.save(owner, next);
            tracing::debug!(%owner, brand = %id, slug = %brand.slug, "brand updated");
            Ok(brand)
        })
    }

    /// Delete a brand; products that referenced it lose their brand.
    pub fn delete_brand(&self, owner: OwnerId, id: BrandId) -> DomainResult<Brand> {
        let removed = self.locks.with(ScopeKey::new(BRAND_SCOPE, owner), || {
            self.brands.remove(owner, &id).ok_or(DomainError::NotFound)
        })?;
        let cleared = self.rewrite_products(owner, |product| {
            (product.brand == Some(id)).then(|| ProductPatch {
                brand: Some(None),
                ..Default::default()
            })
        })?;
        tracing::debug!(%owner, brand = %id, products_cleared = cleared, "brand deleted");
        Ok(removed)
    }

    pub(super) fn brand_ids_matching(&self, owner: OwnerId, name: &str) -> Vec<BrandId> {
        let wanted = name.trim();
        self.brands
            .list(owner)
            .into_iter()
            .filter(|b| b.name.eq_ignore_ascii_case(wanted) || b.slug.as_str() == wanted)
            .map(|b| b.id)
            .collect()
    }
}
