//! Repository for the `products` table.

use catalog_core::types::DbId;
use sqlx::PgPool;

use crate::models::product::{CreateProduct, Product, ProductFilter, ProductPage, UpdateProduct};

/// Column list for the `products` table.
const COLUMNS: &str = "id, name, sku, description, price_cents, stock_quantity, brand_id, \
    primary_category_id, secondary_category_id, tertiary_category_id, quaternary_category_id, \
    product_template_id, image_urls, created_at, updated_at";

/// Shared `WHERE` body for list and count; binds `$1..$5`.
const FILTER_CLAUSE: &str = "($1::BIGINT IS NULL OR brand_id = $1) \
    AND ($2::BIGINT IS NULL OR primary_category_id = $2) \
    AND ($3::BIGINT IS NULL OR secondary_category_id = $3) \
    AND ($4::BIGINT IS NULL OR tertiary_category_id = $4) \
    AND ($5::BIGINT IS NULL OR quaternary_category_id = $5)";

/// Provides CRUD and inventory operations for products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a new product, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProduct) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products \
                (name, sku, description, price_cents, stock_quantity, brand_id, \
                 primary_category_id, secondary_category_id, tertiary_category_id, \
                 quaternary_category_id, image_urls) \
             VALUES ($1, $2, $3, COALESCE($4, 0), COALESCE($5, 0), $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        let path = &input.categories;
        sqlx::query_as::<_, Product>(&query)
            .bind(input.name.trim())
            .bind(input.sku.trim())
            .bind(&input.description)
            .bind(input.price_cents)
            .bind(input.stock_quantity)
            .bind(input.brand_id)
            .bind(path.primary_category_id)
            .bind(path.secondary_category_id)
            .bind(path.tertiary_category_id)
            .bind(path.quaternary_category_id)
            .bind(&input.image_urls)
            .fetch_one(pool)
            .await
    }

    /// Find a product by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One filtered, sorted page of products plus the unpaged total.
    pub async fn list(pool: &PgPool, filter: &ProductFilter) -> Result<ProductPage, sqlx::Error> {
        let path = &filter.categories;
        let order_clause = filter.sort.order_clause(filter.order);

        let query = format!(
            "SELECT {COLUMNS} FROM products \
             WHERE {FILTER_CLAUSE} \
             ORDER BY {order_clause} \
             LIMIT $6 OFFSET $7"
        );
        let items = sqlx::query_as::<_, Product>(&query)
            .bind(filter.brand_id)
            .bind(path.primary_category_id)
            .bind(path.secondary_category_id)
            .bind(path.tertiary_category_id)
            .bind(path.quaternary_category_id)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM products WHERE {FILTER_CLAUSE}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(filter.brand_id)
            .bind(path.primary_category_id)
            .bind(path.secondary_category_id)
            .bind(path.tertiary_category_id)
            .bind(path.quaternary_category_id)
            .fetch_one(pool)
            .await?;

        Ok(ProductPage {
            items,
            total,
            limit: filter.limit,
            offset: filter.offset,
        })
    }

    /// Update a product. Only non-`None` fields are applied; a supplied
    /// category path replaces all four columns.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET \
                name = COALESCE($2, name), \
                sku = COALESCE($3, sku), \
                description = CASE WHEN $4 THEN $5 ELSE description END, \
                price_cents = COALESCE($6, price_cents), \
                brand_id = CASE WHEN $7 THEN $8 ELSE brand_id END, \
                primary_category_id = CASE WHEN $9 THEN $10 ELSE primary_category_id END, \
                secondary_category_id = CASE WHEN $9 THEN $11 ELSE secondary_category_id END, \
                tertiary_category_id = CASE WHEN $9 THEN $12 ELSE tertiary_category_id END, \
                quaternary_category_id = CASE WHEN $9 THEN $13 ELSE quaternary_category_id END, \
                image_urls = COALESCE($14, image_urls) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let path = input.categories.unwrap_or_default();
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.sku.as_deref().map(str::trim))
            .bind(input.description.is_some())
            .bind(input.description.as_ref().and_then(|d| d.as_deref()))
            .bind(input.price_cents)
            .bind(input.brand_id.is_some())
            .bind(input.brand_id.flatten())
            .bind(input.categories.is_some())
            .bind(path.primary_category_id)
            .bind(path.secondary_category_id)
            .bind(path.tertiary_category_id)
            .bind(path.quaternary_category_id)
            .bind(&input.image_urls)
            .fetch_optional(pool)
            .await
    }

    /// Replace the product's image list.
    pub async fn replace_images(
        pool: &PgPool,
        id: DbId,
        urls: &[String],
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET image_urls = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(urls)
            .fetch_optional(pool)
            .await
    }

    /// Add `delta` to the stock level unless that would take it below zero
    /// or past the INTEGER maximum.
    ///
    /// Returns `None` if the product does not exist or the new level would be
    /// out of range at the time of the write.
    pub async fn adjust_stock(
        pool: &PgPool,
        id: DbId,
        delta: i32,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET stock_quantity = stock_quantity + $2 \
             WHERE id = $1 AND stock_quantity::BIGINT + $2 BETWEEN 0 AND 2147483647 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(delta)
            .fetch_optional(pool)
            .await
    }

    /// Delete a product together with its template instance.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let instance_id: Option<Option<DbId>> =
            sqlx::query_scalar("DELETE FROM products WHERE id = $1 RETURNING product_template_id")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(instance_id) = instance_id else {
            tx.rollback().await?;
            return Ok(false);
        };

        if let Some(instance_id) = instance_id {
            sqlx::query("DELETE FROM product_templates WHERE id = $1")
                .bind(instance_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}
