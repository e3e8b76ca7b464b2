//! Category entity model and DTOs.

use catalog_core::category::{CategoryNode, CategoryRank, ParentRefs};
use catalog_core::error::CoreError;
use catalog_core::types::{trimmed, trimmed_opt, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub category_type: String,
    pub parent_primary_id: Option<DbId>,
    pub parent_secondary_id: Option<DbId>,
    pub parent_tertiary_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Category {
    pub fn rank(&self) -> Result<CategoryRank, CoreError> {
        CategoryRank::parse(&self.category_type)
    }

    pub fn parents(&self) -> ParentRefs {
        ParentRefs {
            parent_primary_id: self.parent_primary_id,
            parent_secondary_id: self.parent_secondary_id,
            parent_tertiary_id: self.parent_tertiary_id,
        }
    }

    /// Reduce the row to what hierarchy checks need.
    pub fn node(&self) -> Result<CategoryNode, CoreError> {
        Ok(CategoryNode {
            id: self.id,
            rank: self.rank()?,
            parents: self.parents(),
        })
    }
}

/// DTO for creating a new category.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategory {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub category_type: CategoryRank,
    /// Only the immediate parent is required; higher ancestors are derived.
    #[serde(flatten)]
    pub parents: ParentRefs,
}

/// DTO for updating a category. The rank is fixed at creation.
///
/// If no parent reference is supplied the current parent is kept.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCategory {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[serde(flatten)]
    pub parents: ParentRefs,
}
