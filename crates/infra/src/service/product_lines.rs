use std::sync::PoisonError;

use chrono::Utc;

use catalog_core::{DomainError, DomainResult, OwnerId};
use catalog_products::{
    NewProductLine, ProductId, ProductLine, ProductLineId, ProductLinePatch, ProductLineVariation,
    VariationId, image, product_line,
};

use super::CatalogService;
use crate::owner_store::OwnerStore;
use crate::scope_lock::ScopeKey;

fn line_scope(product: ProductId) -> ScopeKey {
    ScopeKey::new(product_line::ORDERING_SCOPE, product)
}

impl CatalogService {
    /// Create a line under `product`, assigning the next free ordering when
    /// none is given.
    pub fn create_product_line(
        &self,
        owner: OwnerId,
        product: ProductId,
        new: NewProductLine,
    ) -> DomainResult<ProductLine> {
        let line = self.locks.with(line_scope(product), || {
            self.product(owner, product)?;
            let rows = self.lines.list(owner);
            let line = ProductLine::create(
                ProductLineId::new(),
                owner,
                product,
                new,
                Utc::now(),
                &self.line_order,
                &rows,
            )?;
            Ok::<_, DomainError>(self.lines.save(owner, line))
        })?;
        tracing::debug!(
            %owner,
            %product,
            line = %line.id,
            ordering = ?line.ordering,
            "product line created"
        );
        Ok(line)
    }

    pub fn get_product_line(&self, owner: OwnerId, id: ProductLineId) -> DomainResult<ProductLine> {
        self.lines.get(owner, &id).ok_or(DomainError::NotFound)
    }

    /// Patch a line. A move to another product holds the locks of both
    /// products, so neither can see the line half-moved.
    pub fn update_product_line(
        &self,
        owner: OwnerId,
        id: ProductLineId,
        patch: ProductLinePatch,
    ) -> DomainResult<ProductLine> {
        let line = loop {
            let seen = self.get_product_line(owner, id)?;
            let target = patch.product.unwrap_or(seen.product);
            let scopes = [line_scope(seen.product), line_scope(target)];
            let attempt = self.locks.with_all(&scopes, || -> DomainResult<Option<ProductLine>> {
                let current = self.get_product_line(owner, id)?;
                if current.product != seen.product {
                    return Ok(None);
                }
                if target != current.product {
                    self.product(owner, target)?;
                }
                let rows = self.lines.list(owner);
                let next = current.patched(patch.clone(), &self.line_order, &rows)?;
                Ok(Some(self.lines.save(owner, next)))
            })?;
            match attempt {
                Some(line) => break line,
                None => tracing::debug!(%owner, line = %id, "product line moved concurrently; retrying"),
            }
        };
        tracing::debug!(%owner, line = %id, product = %line.product, ordering = ?line.ordering, "product line updated");
        Ok(line)
    }

    /// Delete a line with its images and variation links.
    pub fn delete_product_line(&self, owner: OwnerId, id: ProductLineId) -> DomainResult<ProductLine> {
        let (line, purged) = loop {
            let seen = self.get_product_line(owner, id)?;
            let attempt = self.locks.with(line_scope(seen.product), || -> DomainResult<_> {
                match self.lines.get(owner, &id) {
                    None => Err(DomainError::NotFound),
                    Some(current) if current.product != seen.product => Ok(None),
                    Some(_) => {
                        let line = self.lines.remove(owner, &id).ok_or(DomainError::NotFound)?;
                        let purged = self.purge_line_children(owner, id);
                        Ok(Some((line, purged)))
                    }
                }
            })?;
            if let Some(done) = attempt {
                break done;
            }
        };
        tracing::debug!(%owner, line = %id, purged, "product line deleted");
        Ok(line)
    }

    /// Remove a deleted line's images and variation links; returns the number
    /// of rows removed.
    pub(super) fn purge_line_children(&self, owner: OwnerId, line: ProductLineId) -> usize {
        self.locks.with(ScopeKey::new(image::ORDERING_SCOPE, line), || {
            let images = self.images.remove_where(owner, &|i| i.product_line == line);
            let links = self.drop_links(owner, |link| link.product_line == line);
            images.len() + links
        })
    }

    /// Attach a variation to a line. Each pair may be linked once.
    ///
    /// Runs under the line's image scope, the same lock its deletion purges
    /// links under, so a link can never outlive its line.
    pub fn link_variation(
        &self,
        owner: OwnerId,
        line: ProductLineId,
        variation: VariationId,
    ) -> DomainResult<ProductLineVariation> {
        let link = self.locks.with(ScopeKey::new(image::ORDERING_SCOPE, line), || -> DomainResult<_> {
            self.get_product_line(owner, line)?;
            self.with_attributes(owner, || -> DomainResult<ProductLineVariation> {
                self.variation(owner, variation)?;
                let link = ProductLineVariation {
                    variation,
                    product_line: line,
                };
                let inserted = self
                    .links
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert((owner, link));
                if !inserted {
                    return Err(DomainError::conflict(format!(
                        "variation {variation} is already linked to product line {line}"
                    )));
                }
                Ok(link)
            })
        })?;
        tracing::debug!(%owner, %line, %variation, "variation linked");
        Ok(link)
    }

    pub fn unlink_variation(
        &self,
        owner: OwnerId,
        line: ProductLineId,
        variation: VariationId,
    ) -> DomainResult<()> {
        let removed = self.drop_links(owner, |link| {
            link.product_line == line && link.variation == variation
        });
        if removed == 0 {
            return Err(DomainError::NotFound);
        }
        tracing::debug!(%owner, %line, %variation, "variation unlinked");
        Ok(())
    }

    pub fn line_variations(&self, owner: OwnerId, line: ProductLineId) -> Vec<VariationId> {
        self.links_of(owner)
            .into_iter()
            .filter(|link| link.product_line == line)
            .map(|link| link.variation)
            .collect()
    }
}
