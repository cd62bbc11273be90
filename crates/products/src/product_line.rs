//! Product lines: the sellable SKUs of a product, ordered within their product.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, DomainResult, Entity, EntityId, OwnerId};

use crate::ordering::{OrderAssigner, OrderNumber, Ordered};
use crate::product::ProductId;
use crate::validate::{self, LONG_NAME_MAX, Validated};

catalog_core::uuid_newtype!(
    /// Product line identifier.
    pub struct ProductLineId,
    "ProductLineId"
);

/// Reference field that scopes product line ordering.
pub const ORDERING_SCOPE: &str = "product";

/// A product line row.
///
/// `ordering` is `None` only on a candidate that has not been validated yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLine {
    pub id: ProductLineId,
    pub owner: OwnerId,
    pub product: ProductId,
    pub sku: String,
    /// Price in the smallest currency unit (e.g. cents).
    pub price: u64,
    pub stock_qty: u32,
    pub is_active: bool,
    pub ordering: Option<OrderNumber>,
    pub created_at: DateTime<Utc>,
}

impl Entity for ProductLine {
    type Id = ProductLineId;
    const KIND: &'static str = "product_line";

    fn id(&self) -> &ProductLineId {
        &self.id
    }
}

impl Ordered for ProductLine {
    const REFERENCE_FIELDS: &'static [&'static str] = &["owner", "product"];

    fn reference(&self, field: &str) -> Option<EntityId> {
        match field {
            "owner" => Some(EntityId::from_uuid(*self.owner.as_uuid())),
            "product" => Some(EntityId::from_uuid(*self.product.as_uuid())),
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

/// Input for [`ProductLine::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProductLine {
    pub sku: String,
    pub price: u64,
    pub stock_qty: u32,
    pub is_active: bool,
    pub ordering: Option<OrderNumber>,
}

/// Field changes for an existing product line; `None` leaves a field as is.
///
/// Moving the line to another product without an explicit `ordering` lets
/// the line take the next free position in its new product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductLinePatch {
    pub product: Option<ProductId>,
    pub sku: Option<String>,
    pub price: Option<u64>,
    pub stock_qty: Option<u32>,
    pub is_active: Option<bool>,
    pub ordering: Option<OrderNumber>,
}

impl ProductLine {
    /// Validate a new line under `product` against the stored lines `rows`.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        id: ProductLineId,
        owner: OwnerId,
        product: ProductId,
        new: NewProductLine,
        created_at: DateTime<Utc>,
        assigner: &OrderAssigner<ProductLine>,
        rows: &[ProductLine],
    ) -> DomainResult<Validated<ProductLine>> {
        ProductLine {
            id,
            owner,
            product,
            sku: new.sku,
            price: new.price,
            stock_qty: new.stock_qty,
            is_active: new.is_active,
            ordering: new.ordering,
            created_at,
        }
        .validate(assigner, rows)
    }

    /// Validate `patch` applied to this line against the stored lines `rows`.
    pub fn patched(
        &self,
        patch: ProductLinePatch,
        assigner: &OrderAssigner<ProductLine>,
        rows: &[ProductLine],
    ) -> DomainResult<Validated<ProductLine>> {
        let mut next = self.clone();
        if let Some(product) = patch.product {
            if product != self.product {
                next.product = product;
                next.ordering = None;
            }
        }
        if let Some(sku) = patch.sku {
            next.sku = sku;
        }
        if let Some(price) = patch.price {
            next.price = price;
        }
        if let Some(stock_qty) = patch.stock_qty {
            next.stock_qty = stock_qty;
        }
        if let Some(is_active) = patch.is_active {
            next.is_active = is_active;
        }
        if let Some(ordering) = patch.ordering {
            next.ordering = Some(ordering);
        }
        next.validate(assigner, rows)
    }

    fn validate(
        mut self,
        assigner: &OrderAssigner<ProductLine>,
        rows: &[ProductLine],
    ) -> DomainResult<Validated<ProductLine>> {
        self.sku = validate::normalize_name("sku", &self.sku, LONG_NAME_MAX)?;
        let sku_taken = rows
            .iter()
            .any(|r| r.id != self.id && r.product == self.product && r.sku == self.sku);
        if sku_taken {
            return Err(DomainError::conflict(format!(
                "sku '{}' already exists for product {}",
                self.sku, self.product
            )));
        }
        assigner.assign_or_validate(&mut self, rows)?;
        Ok(Validated::new(self))
    }
}
