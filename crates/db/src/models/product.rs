//! Product entity model, DTOs, and list filter.

use catalog_core::category::CategoryPath;
use catalog_core::listing::{ProductSort, SortOrder};
use catalog_core::types::{nullable, trimmed, trimmed_opt, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock_quantity: i32,
    pub brand_id: Option<DbId>,
    pub primary_category_id: Option<DbId>,
    pub secondary_category_id: Option<DbId>,
    pub tertiary_category_id: Option<DbId>,
    pub quaternary_category_id: Option<DbId>,
    pub product_template_id: Option<DbId>,
    pub image_urls: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new product.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProduct {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "sku is required"))]
    pub sku: String,
    pub description: Option<String>,
    /// Defaults to 0 if omitted.
    #[validate(range(min = 0, message = "price must not be negative"))]
    pub price_cents: Option<i64>,
    /// Defaults to 0 if omitted.
    #[validate(range(min = 0, message = "stock must not be negative"))]
    pub stock_quantity: Option<i32>,
    pub brand_id: Option<DbId>,
    #[serde(default)]
    pub categories: CategoryPath,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// DTO for updating an existing product. All fields are optional.
///
/// `description` and `brand_id` distinguish an omitted key (keep) from an
/// explicit `null` (clear). Stock is changed through the stock adjustment
/// endpoint, not here.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProduct {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, message = "sku must not be empty"))]
    pub sku: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[validate(range(min = 0, message = "price must not be negative"))]
    pub price_cents: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub brand_id: Option<Option<DbId>>,
    /// If `Some`, replaces the whole category path.
    pub categories: Option<CategoryPath>,
    /// If `Some`, replaces the image list.
    pub image_urls: Option<Vec<String>>,
}

/// Filter, sort, and page for product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub brand_id: Option<DbId>,
    pub categories: CategoryPath,
    pub sort: ProductSort,
    pub order: SortOrder,
    pub limit: i64,
    pub offset: i64,
}

/// One page of products plus the unpaged total.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
