//! Product catalog domain module.
//!
//! This crate contains the business rules for the catalog (categories, brands,
//! products, product lines, images, attributes), implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).
//!
//! Writes go through an entity's `create`/`patched` routine, which returns a
//! [`Validated`] value; stores only accept validated values.

pub mod attribute;
pub mod brand;
pub mod category;
pub mod image;
pub mod ordering;
pub mod product;
pub mod product_line;
pub mod slug;
pub mod validate;

pub use attribute::{Attribute, AttributeId, ProductLineVariation, Variation, VariationId};
pub use brand::{Brand, BrandId, BrandPatch};
pub use category::{Category, CategoryId, CategoryTree, DeletedCategory, Descendants, NewCategory};
pub use image::{ProductImage, ProductImageId, ProductImagePatch};
pub use ordering::{OrderAssigner, OrderNumber, Ordered};
pub use product::{NewProduct, Product, ProductId, ProductPatch};
pub use product_line::{NewProductLine, ProductLine, ProductLineId, ProductLinePatch};
pub use slug::Slug;
pub use validate::Validated;
