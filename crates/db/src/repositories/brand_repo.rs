//! Repository for the `brands` table.

use catalog_core::types::DbId;
use sqlx::PgPool;

use crate::models::brand::{Brand, CreateBrand, UpdateBrand};

/// Column list for the `brands` table.
const COLUMNS: &str = "id, name, description, logo_url, primary_category_id, \
    secondary_category_id, tertiary_category_id, quaternary_category_id, \
    created_at, updated_at";

/// Provides CRUD operations for brands.
pub struct BrandRepo;

impl BrandRepo {
    /// Insert a new brand, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateBrand) -> Result<Brand, sqlx::Error> {
        let query = format!(
            "INSERT INTO brands \
                (name, description, logo_url, primary_category_id, secondary_category_id, \
                 tertiary_category_id, quaternary_category_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        let path = &input.categories;
        sqlx::query_as::<_, Brand>(&query)
            .bind(input.name.trim())
            .bind(input.description.is_some())
            .bind(input.description.as_deref())
            .bind(&input.logo_url)
            .bind(path.primary_category_id)
            .bind(path.secondary_category_id)
            .bind(path.tertiary_category_id)
            .bind(path.quaternary_category_id)
            .fetch_one(pool)
            .await
    }

    /// Find a brand by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Brand>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM brands WHERE id = $1");
        sqlx::query_as::<_, Brand>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all brands ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Brand>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM brands ORDER BY name, id");
        sqlx::query_as::<_, Brand>(&query).fetch_all(pool).await
    }

    /// Update a brand. Only non-`None` fields are applied; a supplied
    /// category path replaces all four columns.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBrand,
    ) -> Result<Option<Brand>, sqlx::Error> {
        let query = format!(
            "UPDATE brands SET \
                name = COALESCE($2, name), \
                description = CASE WHEN $3 THEN $4 ELSE description END, \
                logo_url = COALESCE($5, logo_url), \
                primary_category_id = CASE WHEN $6 THEN $7 ELSE primary_category_id END, \
                secondary_category_id = CASE WHEN $6 THEN $8 ELSE secondary_category_id END, \
                tertiary_category_id = CASE WHEN $6 THEN $9 ELSE tertiary_category_id END, \
                quaternary_category_id = CASE WHEN $6 THEN $10 ELSE quaternary_category_id END \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let path = input.categories.unwrap_or_default();
        sqlx::query_as::<_, Brand>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.description.is_some())
            .bind(input.description.as_ref().and_then(|d| d.as_deref()))
            .bind(&input.logo_url)
            .bind(input.categories.is_some())
            .bind(path.primary_category_id)
            .bind(path.secondary_category_id)
            .bind(path.tertiary_category_id)
            .bind(path.quaternary_category_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a brand. Products keep existing with `brand_id` cleared.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM brands WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
