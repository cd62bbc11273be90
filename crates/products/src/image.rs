//! Product images, ordered within their product line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use catalog_core::{DomainError, DomainResult, Entity, EntityId, OwnerId};

use crate::ordering::{OrderAssigner, OrderNumber, Ordered};
use crate::product_line::ProductLineId;
use crate::validate::{self, LONG_NAME_MAX, Validated};

catalog_core::uuid_newtype!(
    /// Product image identifier.
    pub struct ProductImageId,
    "ProductImageId"
);

/// Reference field that scopes image ordering.
pub const ORDERING_SCOPE: &str = "product_line";

/// Directory that uploaded image payloads are stored under.
pub const UPLOAD_DIR: &str = "uploads/product";

/// A product image row. `image` is the storage path of the uploaded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub owner: OwnerId,
    pub product_line: ProductLineId,
    pub alt_text: String,
    pub image: Option<String>,
    pub ordering: Option<OrderNumber>,
    pub created_at: DateTime<Utc>,
}

impl Entity for ProductImage {
    type Id = ProductImageId;
    const KIND: &'static str = "product_image";

    fn id(&self) -> &ProductImageId {
        &self.id
    }
}

impl Ordered for ProductImage {
    const REFERENCE_FIELDS: &'static [&'static str] = &["owner", "product_line"];

    fn reference(&self, field: &str) -> Option<EntityId> {
        match field {
            "owner" => Some(EntityId::from_uuid(*self.owner.as_uuid())),
            "product_line" => Some(EntityId::from_uuid(*self.product_line.as_uuid())),
            _ => None,
        }
    }

    fn ordering(&self) -> Option<OrderNumber> {
        self.ordering
    }

    fn set_ordering(&mut self, ordering: OrderNumber) {
        self.ordering = Some(ordering);
    }
}

/// Field changes for an existing image; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductImagePatch {
    pub alt_text: Option<String>,
    pub ordering: Option<OrderNumber>,
    pub image: Option<String>,
}

/// Storage path for an uploaded file: a fresh uuid under [`UPLOAD_DIR`],
/// keeping the original extension.
pub fn image_file_path(filename: &str) -> DomainResult<String> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .ok_or_else(|| DomainError::validation(format!("'{filename}' has no usable file extension")))?;
    Ok(format!("{UPLOAD_DIR}/{}.{ext}", Uuid::now_v7()))
}

impl ProductImage {
    /// Validate a new image under `product_line` against the stored images `rows`.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        id: ProductImageId,
        owner: OwnerId,
        product_line: ProductLineId,
        alt_text: &str,
        ordering: Option<OrderNumber>,
        created_at: DateTime<Utc>,
        assigner: &OrderAssigner<ProductImage>,
        rows: &[ProductImage],
    ) -> DomainResult<Validated<ProductImage>> {
        ProductImage {
            id,
            owner,
            product_line,
            alt_text: alt_text.to_string(),
            image: None,
            ordering,
            created_at,
        }
        .validate(assigner, rows)
    }

    /// Validate `patch` applied to this image against the stored images `rows`.
    pub fn patched(
        &self,
        patch: ProductImagePatch,
        assigner: &OrderAssigner<ProductImage>,
        rows: &[ProductImage],
    ) -> DomainResult<Validated<ProductImage>> {
        let mut next = self.clone();
        if let Some(alt_text) = patch.alt_text {
            next.alt_text = alt_text;
        }
        if let Some(ordering) = patch.ordering {
            next.ordering = Some(ordering);
        }
        if let Some(image) = patch.image {
            next.image = Some(image);
        }
        next.validate(assigner, rows)
    }

    fn validate(
        mut self,
        assigner: &OrderAssigner<ProductImage>,
        rows: &[ProductImage],
    ) -> DomainResult<Validated<ProductImage>> {
        self.alt_text = self.alt_text.trim().to_string();
        validate::require_max_len("alt_text", &self.alt_text, LONG_NAME_MAX)?;
        assigner.assign_or_validate(&mut self, rows)?;
        Ok(Validated::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assigner() -> OrderAssigner<ProductImage> {
        OrderAssigner::new(ORDERING_SCOPE).unwrap()
    }

    fn add(rows: &mut Vec<ProductImage>, line: ProductLineId, ordering: Option<u32>) -> DomainResult<ProductImage> {
        let image = ProductImage::create(
            ProductImageId::new(),
            OwnerId::new(),
            line,
            "front view",
            ordering.map(|o| OrderNumber::new(o).unwrap()),
            Utc::now(),
            &assigner(),
            rows.as_slice(),
        )?
        .into_inner();
        rows.push(image.clone());
        Ok(image)
    }

    #[test]
    fn images_are_ordered_per_product_line() {
        let (l1, l2) = (ProductLineId::new(), ProductLineId::new());
        let mut rows = Vec::new();
        assert_eq!(add(&mut rows, l1, None).unwrap().ordering.unwrap().get(), 1);
        assert_eq!(add(&mut rows, l1, None).unwrap().ordering.unwrap().get(), 2);
        assert_eq!(add(&mut rows, l2, None).unwrap().ordering.unwrap().get(), 1);
    }

    #[test]
    fn duplicate_image_ordering_is_rejected() {
        let line = ProductLineId::new();
        let mut rows = Vec::new();
        add(&mut rows, line, Some(2)).unwrap();
        let err = add(&mut rows, line, Some(2)).unwrap_err();
        assert!(matches!(
            err,
            DomainError::DuplicateOrdering { ordering: 2, scope_field: "product_line", .. }
        ));
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn file_path_keeps_extension_under_upload_dir() {
        let path = image_file_path("Front.JPG").unwrap();
        assert!(path.starts_with("uploads/product/"));
        assert!(path.ends_with(".jpg"));
        assert!(image_file_path("noext").is_err());
        assert!(image_file_path("weird.").is_err());
    }

    #[test]
    fn registering_with_wrong_scope_fails() {
        assert!(matches!(
            OrderAssigner::<ProductImage>::new("product"),
            Err(DomainError::MissingScopeField { entity: "product_image", .. })
        ));
    }
}
