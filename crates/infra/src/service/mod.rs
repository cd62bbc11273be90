//! Catalog application service.
//!
//! Every write follows the same shape: take the scope lock, read the rows the
//! entity's validation needs, run the entity's `create`/`patched` routine and
//! persist the resulting [`Validated`](catalog_products::Validated) row. A
//! rejected write never touches a store.

mod attributes;
mod brands;
mod categories;
mod images;
mod product_lines;
mod products;

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use catalog_core::{DomainResult, OwnerId};
use catalog_products::{
    Attribute, Brand, CategoryTree, OrderAssigner, Product, ProductImage, ProductLine,
    ProductLineVariation, Variation, image, product_line,
};

use crate::owner_store::InMemoryOwnerStore;
use crate::scope_lock::ScopeLocks;

pub use attributes::{AttributeDetail, AttributeInput, AttributePatch};
pub use categories::{CategoryInput, CategoryPatch};
pub use products::{LineDetail, ProductChanges, ProductDetail, ProductFilter, ProductInput};

/// Owner-scoped catalog operations over in-memory stores.
#[derive(Debug)]
pub struct CatalogService {
    categories: RwLock<HashMap<OwnerId, CategoryTree>>,
    brands: InMemoryOwnerStore<Brand>,
    products: InMemoryOwnerStore<Product>,
    lines: InMemoryOwnerStore<ProductLine>,
    images: InMemoryOwnerStore<ProductImage>,
    attributes: InMemoryOwnerStore<Attribute>,
    variations: InMemoryOwnerStore<Variation>,
    links: RwLock<HashSet<(OwnerId, ProductLineVariation)>>,
    line_order: OrderAssigner<ProductLine>,
    image_order: OrderAssigner<ProductImage>,
    locks: ScopeLocks,
}

impl CatalogService {
    /// Build the service and register ordering for product lines (scoped by
    /// product) and images (scoped by product line).
    ///
    /// Fails with `MissingScopeField` if a registration names a field the
    /// entity does not declare.
    pub fn new() -> DomainResult<Self> {
        Self::with_ordering(
            OrderAssigner::new(product_line::ORDERING_SCOPE)?,
            OrderAssigner::new(image::ORDERING_SCOPE)?,
        )
    }

    fn with_ordering(
        line_order: OrderAssigner<ProductLine>,
        image_order: OrderAssigner<ProductImage>,
    ) -> DomainResult<Self> {
        tracing::info!(
            product_line_scope = line_order.scope_field(),
            image_scope = image_order.scope_field(),
            "ordering registered"
        );
        Ok(Self {
            categories: RwLock::new(HashMap::new()),
            brands: InMemoryOwnerStore::new(),
            products: InMemoryOwnerStore::new(),
            lines: InMemoryOwnerStore::new(),
            images: InMemoryOwnerStore::new(),
            attributes: InMemoryOwnerStore::new(),
            variations: InMemoryOwnerStore::new(),
            links: RwLock::new(HashSet::new()),
            line_order,
            image_order,
            locks: ScopeLocks::new(),
        })
    }

    fn links_of(&self, owner: OwnerId) -> Vec<ProductLineVariation> {
        let links = self.links.read().unwrap_or_else(PoisonError::into_inner);
        links
            .iter()
            .filter(|(o, _)| *o == owner)
            .map(|(_, link)| *link)
            .collect()
    }

    fn drop_links(&self, owner: OwnerId, pred: impl Fn(&ProductLineVariation) -> bool) -> usize {
        let mut links = self.links.write().unwrap_or_else(PoisonError::into_inner);
        let before = links.len();
        links.retain(|(o, link)| *o != owner || !pred(link));
        before - links.len()
    }
}
