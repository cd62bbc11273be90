use chrono::Utc;

use catalog_core::{DomainError, DomainResult, OwnerId};
use catalog_products::image::{self, image_file_path};
use catalog_products::{OrderNumber, ProductImage, ProductImageId, ProductImagePatch, ProductLineId};

use super::CatalogService;
use crate::owner_store::OwnerStore;
use crate::scope_lock::ScopeKey;

impl CatalogService {
    pub fn create_image(
        &self,
        owner: OwnerId,
        line: ProductLineId,
        alt_text: &str,
        ordering: Option<OrderNumber>,
    ) -> DomainResult<ProductImage> {
        let image = self.locks.with(ScopeKey::new(image::ORDERING_SCOPE, line), || -> DomainResult<_> {
            if self.lines.get(owner, &line).is_none() {
                return Err(DomainError::unresolved("product_line", line));
            }
            let rows = self.images.list(owner);
            let image = ProductImage::create(
                ProductImageId::new(),
                owner,
                line,
                alt_text,
                ordering,
                Utc::now(),
                &self.image_order,
                &rows,
            )?;
            Ok(self.images.save(owner, image))
        })?;
        tracing::debug!(%owner, %line, image = %image.id, ordering = ?image.ordering, "image created");
        Ok(image)
    }

    pub fn get_image(&self, owner: OwnerId, id: ProductImageId) -> DomainResult<ProductImage> {
        self.images.get(owner, &id).ok_or(DomainError::NotFound)
    }

    /// Images of one line in ordering order.
    pub fn list_images(&self, owner: OwnerId, line: ProductLineId) -> Vec<ProductImage> {
        let mut images: Vec<ProductImage> = self
            .images
            .list(owner)
            .into_iter()
            .filter(|i| i.product_line == line)
            .collect();
        images.sort_by_key(|i| i.ordering);
        images
    }

    pub fn update_image(
        &self,
        owner: OwnerId,
        id: ProductImageId,
        patch: ProductImagePatch,
    ) -> DomainResult<ProductImage> {
        let line = self.get_image(owner, id)?.product_line;
        let image = self.locks.with(ScopeKey::new(image::ORDERING_SCOPE, line), || {
            let current = self.get_image(owner, id)?;
            let rows = self.images.list(owner);
            let next = current.patched(patch, &self.image_order, &rows)?;
            Ok::<_, DomainError>(self.images.save(owner, next))
        })?;
        tracing::debug!(%owner, image = %id, ordering = ?image.ordering, "image updated");
        Ok(image)
    }

    /// Record an uploaded payload for `id` under a fresh storage path derived
    /// from `filename`.
    pub fn upload_image(&self, owner: OwnerId, id: ProductImageId, filename: &str) -> DomainResult<ProductImage> {
        let path = image_file_path(filename)?;
        self.update_image(
            owner,
            id,
            ProductImagePatch {
                image: Some(path),
                ..Default::default()
            },
        )
    }

    pub fn delete_image(&self, owner: OwnerId, id: ProductImageId) -> DomainResult<ProductImage> {
        let line = self.get_image(owner, id)?.product_line;
        let image = self.locks.with(ScopeKey::new(image::ORDERING_SCOPE, line), || {
            self.images.remove(owner, &id).ok_or(DomainError::NotFound)
        })?;
        tracing::debug!(%owner, image = %id, "image deleted");
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ProductInput;
    use catalog_products::NewProductLine;

    fn setup() -> (CatalogService, OwnerId, ProductLineId) {
        let svc = CatalogService::new().unwrap();
        let owner = OwnerId::new();
        let product = svc.create_product(owner, ProductInput::named("Lamp")).unwrap();
        let line = svc
            .create_product_line(
                owner,
                product.id,
                NewProductLine { sku: "brass".into(), price: 4200, stock_qty: 2, is_active: true, ordering: None },
            )
            .unwrap();
        (svc, owner, line.id)
    }

    #[test]
    fn images_count_up_within_line_and_reject_duplicates() {
        let (svc, owner, line) = setup();
        let a = svc.create_image(owner, line, "front", None).unwrap();
        let b = svc.create_image(owner, line, "back", None).unwrap();
        assert_eq!((a.ordering.unwrap().get(), b.ordering.unwrap().get()), (1, 2));

        let err = svc
            .update_image(owner, b.id, ProductImagePatch { ordering: Some(OrderNumber::FIRST), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateOrdering { ordering: 1, scope_field: "product_line", .. }));
        assert_eq!(svc.get_image(owner, b.id).unwrap().ordering, b.ordering);
    }

    #[test]
    fn unknown_line_is_unresolved() {
        let (svc, owner, _) = setup();
        let err = svc.create_image(owner, ProductLineId::new(), "x", None).unwrap_err();
        assert!(matches!(err, DomainError::UnresolvedScopeReference { kind: "product_line", .. }));
    }

    #[test]
    fn upload_stores_a_path_and_keeps_ordering() {
        let (svc, owner, line) = setup();
        let img = svc.create_image(owner, line, "front", None).unwrap();
        let uploaded = svc.upload_image(owner, img.id, "photo.PNG").unwrap();
        let path = uploaded.image.as_deref().unwrap();
        assert!(path.starts_with(image::UPLOAD_DIR));
        assert!(path.ends_with(".png"));
        assert_eq!(uploaded.ordering, img.ordering);
        assert_eq!(svc.list_images(owner, line).len(), 1);
    }
}
