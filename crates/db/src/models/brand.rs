//! Brand entity model and DTOs.

use catalog_core::category::CategoryPath;
use catalog_core::types::{nullable, trimmed, trimmed_opt, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `brands` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Brand {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub primary_category_id: Option<DbId>,
    pub secondary_category_id: Option<DbId>,
    pub tertiary_category_id: Option<DbId>,
    pub quaternary_category_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new brand.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBrand {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(url(message = "logo_url must be a valid URL"))]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub categories: CategoryPath,
}

/// DTO for updating an existing brand. All fields are optional.
///
/// An explicit `null` for `description` clears it; an omitted key keeps it.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateBrand {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[validate(url(message = "logo_url must be a valid URL"))]
    pub logo_url: Option<String>,
    /// If `Some`, replaces the whole category path.
    pub categories: Option<CategoryPath>,
}
