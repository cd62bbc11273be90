use serde::{Deserialize, Deserializer};

use catalog_auth::{NewUser, UserPatch};
use catalog_core::DomainResult;
use catalog_infra::{
    AttributeInput, AttributePatch, CategoryInput, CategoryPatch, ProductChanges, ProductFilter,
    ProductInput,
};
use catalog_products::{
    BrandId, BrandPatch, CategoryId, NewProductLine, OrderNumber, ProductId, ProductImagePatch,
    ProductLineId, ProductLinePatch,
};

fn default_true() -> bool {
    true
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn ordering(raw: Option<u32>) -> DomainResult<Option<OrderNumber>> {
    raw.map(OrderNumber::new).transpose()
}

// -------------------------
// Categories
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub parent: Option<CategoryId>,
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl From<CreateCategoryRequest> for CategoryInput {
    fn from(req: CreateCategoryRequest) -> Self {
        Self {
            name: req.name,
            is_active: req.is_active,
            parent: req.parent,
            attributes: req.attributes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub parent: Option<Option<CategoryId>>,
    pub attributes: Option<Vec<String>>,
}

impl From<UpdateCategoryRequest> for CategoryPatch {
    fn from(req: UpdateCategoryRequest) -> Self {
        Self {
            name: req.name,
            is_active: req.is_active,
            parent: req.parent,
            attributes: req.attributes,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DescendantsQuery {
    #[serde(default)]
    pub include_self: bool,
}

// -------------------------
// Brands
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateBrandRequest {
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBrandRequest {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

impl From<UpdateBrandRequest> for BrandPatch {
    fn from(req: UpdateBrandRequest) -> Self {
        Self {
            name: req.name,
            is_active: req.is_active,
        }
    }
}

// -------------------------
// Products
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub brand: Option<BrandId>,
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub is_digital: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl From<CreateProductRequest> for ProductInput {
    fn from(req: CreateProductRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            brand: req.brand,
            category: req.category,
            attributes: req.attributes,
            is_digital: req.is_digital,
            is_active: req.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub brand: Option<Option<BrandId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub category: Option<Option<CategoryId>>,
    pub attributes: Option<Vec<String>>,
    pub is_digital: Option<bool>,
    pub is_active: Option<bool>,
}

impl From<UpdateProductRequest> for ProductChanges {
    fn from(req: UpdateProductRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            brand: req.brand,
            category: req.category,
            attributes: req.attributes,
            is_digital: req.is_digital,
            is_active: req.is_active,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
}

impl From<ProductListQuery> for ProductFilter {
    fn from(q: ProductListQuery) -> Self {
        Self {
            category: q.category.filter(|c| !c.trim().is_empty()),
            brand: q.brand.filter(|b| !b.trim().is_empty()),
        }
    }
}

// -------------------------
// Product lines
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProductLineRequest {
    pub sku: String,
    pub price: u64,
    #[serde(default)]
    pub stock_qty: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub ordering: Option<u32>,
}

impl CreateProductLineRequest {
    pub fn into_new(self) -> DomainResult<NewProductLine> {
        Ok(NewProductLine {
            sku: self.sku,
            price: self.price,
            stock_qty: self.stock_qty,
            is_active: self.is_active,
            ordering: ordering(self.ordering)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductLineRequest {
    pub product: Option<ProductId>,
    pub sku: Option<String>,
    pub price: Option<u64>,
    pub stock_qty: Option<u32>,
    pub is_active: Option<bool>,
    pub ordering: Option<u32>,
}

impl UpdateProductLineRequest {
    pub fn into_patch(self) -> DomainResult<ProductLinePatch> {
        Ok(ProductLinePatch {
            product: self.product,
            sku: self.sku,
            price: self.price,
            stock_qty: self.stock_qty,
            is_active: self.is_active,
            ordering: ordering(self.ordering)?,
        })
    }
}

// -------------------------
// Images
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateImageRequest {
    pub product_line: ProductLineId,
    #[serde(default)]
    pub alt_text: String,
    pub ordering: Option<u32>,
}

impl CreateImageRequest {
    pub fn ordering(&self) -> DomainResult<Option<OrderNumber>> {
        ordering(self.ordering)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateImageRequest {
    pub alt_text: Option<String>,
    pub ordering: Option<u32>,
}

impl UpdateImageRequest {
    pub fn into_patch(self) -> DomainResult<ProductImagePatch> {
        Ok(ProductImagePatch {
            alt_text: self.alt_text,
            ordering: ordering(self.ordering)?,
            image: None,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadImageRequest {
    pub filename: String,
}

// -------------------------
// Attributes
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateAttributeRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub variations: Vec<String>,
}

impl From<CreateAttributeRequest> for AttributeInput {
    fn from(req: CreateAttributeRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            variations: req.variations,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateAttributeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub variations: Option<Vec<String>>,
}

impl From<UpdateAttributeRequest> for AttributePatch {
    fn from(req: UpdateAttributeRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            variations: req.variations,
        }
    }
}

// -------------------------
// Users
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub password: String,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            email: req.email,
            name: req.name,
            password: req.password,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            email: req.email,
            name: req.name,
            password: req.password,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}
