use chrono::Utc;
use serde::Serialize;

use catalog_core::{DomainError, DomainResult, OwnerId};
use catalog_products::{
    BrandId, CategoryId, NewProduct, Product, ProductId, ProductImage, ProductLine, ProductPatch,
    Variation, product_line,
};

use super::CatalogService;
use crate::owner_store::OwnerStore;
use crate::scope_lock::ScopeKey;

const PRODUCT_SCOPE: &str = "products";

/// Input for [`CatalogService::create_product`]. Attributes are given by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub brand: Option<BrandId>,
    pub category: Option<CategoryId>,
    pub attributes: Vec<String>,
    pub is_digital: bool,
    pub is_active: bool,
}

impl ProductInput {
    /// An active, physical product with nothing but a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            brand: None,
            category: None,
            attributes: Vec::new(),
            is_digital: false,
            is_active: true,
        }
    }
}

/// Changes for [`CatalogService::update_product`]; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<Option<BrandId>>,
    pub category: Option<Option<CategoryId>>,
    pub attributes: Option<Vec<String>>,
    pub is_digital: Option<bool>,
    pub is_active: Option<bool>,
}

/// List filter. `category` matches a category by name or slug and includes
/// products of every category below it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub brand: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDetail {
    #[serde(flatten)]
    pub line: ProductLine,
    pub images: Vec<ProductImage>,
    pub variations: Vec<Variation>,
}

/// A product with its active lines in ordering order, each line with its
/// images (in ordering order) and variations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub lines: Vec<LineDetail>,
}

impl CatalogService {
    fn check_product_refs(
        &self,
        owner: OwnerId,
        brand: Option<BrandId>,
        category: Option<CategoryId>,
    ) -> DomainResult<()> {
        if let Some(brand) = brand {
            if self.brands.get(owner, &brand).is_none() {
                return Err(DomainError::unresolved("brand", brand));
            }
        }
        if let Some(category) = category {
            if !self.tree(owner).contains(&category) {
                return Err(DomainError::unresolved("category", category));
            }
        }
        Ok(())
    }

    pub fn create_product(&self, owner: OwnerId, input: ProductInput) -> DomainResult<Product> {
        let product = self.with_products(owner, || {
            self.check_product_refs(owner, input.brand, input.category)?;
            let existing = self.products.list(owner);
            let candidate = Product::create(
                ProductId::new(),
                owner,
                NewProduct {
                    name: input.name,
                    description: input.description,
                    brand: input.brand,
                    category: input.category,
                    attributes: Vec::new(),
                    is_digital: input.is_digital,
                    is_active: input.is_active,
                },
                Utc::now(),
                |s| existing.iter().any(|p| p.slug.as_str() == s),
            )?;
            let candidate = if input.attributes.is_empty() {
                candidate
            } else {
                let attributes = self.resolve_attributes(owner, &input.attributes)?;
                candidate.patched(ProductPatch {
                    attributes: Some(attributes),
                    ..Default::default()
                })?
            };
            Ok::<_, DomainError>(self.products.save(owner, candidate))
        })?;
        tracing::debug!(%owner, product = %product.id, slug = %product.slug, "product created");
        Ok(product)
    }

    pub(super) fn product(&self, owner: OwnerId, id: ProductId) -> DomainResult<Product> {
        self.products
            .get(owner, &id)
            .ok_or_else(|| DomainError::unresolved("product", id))
    }

    pub fn product_by_slug(&self, owner: OwnerId, slug: &str) -> DomainResult<Product> {
        self.products
            .list(owner)
            .into_iter()
            .find(|p| p.slug.as_str() == slug)
            .ok_or(DomainError::NotFound)
    }

    pub fn get_product(&self, owner: OwnerId, slug: &str) -> DomainResult<ProductDetail> {
        let product = self.product_by_slug(owner, slug)?;

        let mut lines: Vec<ProductLine> = self
            .lines
            .list(owner)
            .into_iter()
            .filter(|l| l.product == product.id && l.is_active)
            .collect();
        lines.sort_by_key(|l| l.ordering);

        let images = self.images.list(owner);
        let links = self.links_of(owner);
        let lines = lines
            .into_iter()
            .map(|line| {
                let mut line_images: Vec<ProductImage> = images
                    .iter()
                    .filter(|i| i.product_line == line.id)
                    .cloned()
                    .collect();
                line_images.sort_by_key(|i| i.ordering);
                let variations = links
                    .iter()
                    .filter(|link| link.product_line == line.id)
                    .filter_map(|link| self.variations.get(owner, &link.variation))
                    .collect();
                LineDetail {
                    line,
                    images: line_images,
                    variations,
                }
            })
            .collect();

        Ok(ProductDetail { product, lines })
    }

    /// Products of `owner`, newest first.
    pub fn list_products(&self, owner: OwnerId, filter: &ProductFilter) -> Vec<Product> {
        let categories = filter
            .category
            .as_deref()
            .map(|name| self.category_ids_matching(owner, name));
        let brands = filter
            .brand
            .as_deref()
            .map(|name| self.brand_ids_matching(owner, name));

        let mut products: Vec<Product> = self
            .products
            .list(owner)
            .into_iter()
            .filter(|p| match &categories {
                Some(ids) => p.category.is_some_and(|c| ids.contains(&c)),
                None => true,
            })
            .filter(|p| match &brands {
                Some(ids) => p.brand.is_some_and(|b| ids.contains(&b)),
                None => true,
            })
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        products
    }

    pub fn update_product(
        &self,
        owner: OwnerId,
        slug: &str,
        changes: ProductChanges,
    ) -> DomainResult<Product> {
        let product = self.with_products(owner, || {
            let current = self.product_by_slug(owner, slug)?;
            self.check_product_refs(owner, changes.brand.flatten(), changes.category.flatten())?;

            let mut patch = ProductPatch {
                name: changes.name,
                description: changes.description,
                brand: changes.brand,
                category: changes.category,
                attributes: None,
                is_digital: changes.is_digital,
                is_active: changes.is_active,
            };
            // Validate the plain fields before any attribute gets created.
            current.patched(patch.clone())?;
            if let Some(names) = &changes.attributes {
                patch.attributes = Some(self.resolve_attributes(owner, names)?);
            }
            Ok::<_, DomainError>(self.products.save(owner, current.patched(patch)?))
        })?;
        tracing::debug!(%owner, product = %product.id, "product updated");
        Ok(product)
    }

    /// Delete a product with its lines, their images and variation links.
    pub fn delete_product(&self, owner: OwnerId, slug: &str) -> DomainResult<Product> {
        let (product, lines, images) = self.with_products(owner, || {
            let product = self.product_by_slug(owner, slug)?;
            let (lines, images) = self.locks.with(ScopeKey::new(product_line::ORDERING_SCOPE, product.id), || {
                self.products.remove(owner, &product.id);
                let lines = self.lines.remove_where(owner, &|l| l.product == product.id);
                let images: usize = lines.iter().map(|l| self.purge_line_children(owner, l.id)).sum();
                (lines.len(), images)
            });
            Ok::<_, DomainError>((product, lines, images))
        })?;
        tracing::debug!(%owner, product = %product.id, lines, images, "product deleted");
        Ok(product)
    }

    /// Run `f` under the owner's product lock. Every product write goes
    /// through here, so a write never re-saves a product deleted meanwhile.
    fn with_products<R>(&self, owner: OwnerId, f: impl FnOnce() -> R) -> R {
        self.locks.with(ScopeKey::new(PRODUCT_SCOPE, owner), f)
    }

    /// Apply `change` to every product of `owner` it returns a patch for;
    /// returns the number of products rewritten.
    pub(super) fn rewrite_products(
        &self,
        owner: OwnerId,
        change: impl Fn(&Product) -> Option<ProductPatch>,
    ) -> DomainResult<usize> {
        self.with_products(owner, || -> DomainResult<usize> {
            let mut rewritten = 0;
            for product in self.products.list(owner) {
                if let Some(patch) = change(&product) {
                    self.products.save(owner, product.patched(patch)?);
                    rewritten += 1;
                }
            }
            Ok(rewritten)
        })
    }
}
