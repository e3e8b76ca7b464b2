//! Shared query parameter types for API handlers.

use catalog_core::category::CategoryRank;
use catalog_core::listing::{ProductSort, SortOrder};
use catalog_core::types::DbId;
use catalog_db::models::status::StatusId;
use serde::Deserialize;

/// `GET /templates?status_id=`
#[derive(Debug, Deserialize)]
pub struct TemplateListParams {
    pub status_id: Option<StatusId>,
}

/// `GET /categories?category_type=&parent_id=`
#[derive(Debug, Deserialize)]
pub struct CategoryListParams {
    pub category_type: Option<CategoryRank>,
    pub parent_id: Option<DbId>,
}

/// `GET /categories/cascade?primary_category_id=&...`: the selection made
/// so far in a cascading picker.
#[derive(Debug, Default, Deserialize)]
pub struct CascadeParams {
    pub primary_category_id: Option<DbId>,
    pub secondary_category_id: Option<DbId>,
    pub tertiary_category_id: Option<DbId>,
    pub quaternary_category_id: Option<DbId>,
}

/// `GET /products?limit=&offset=&sort=&order=&brand_id=&<rank>_category_id=`
///
/// `limit` / `offset` are clamped in the handler via `clamp_limit` /
/// `clamp_offset`.
#[derive(Debug, Deserialize)]
pub struct ProductListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    #[serde(default)]
    pub sort: ProductSort,
    #[serde(default)]
    pub order: SortOrder,
    pub brand_id: Option<DbId>,
    pub primary_category_id: Option<DbId>,
    pub secondary_category_id: Option<DbId>,
    pub tertiary_category_id: Option<DbId>,
    pub quaternary_category_id: Option<DbId>,
}
