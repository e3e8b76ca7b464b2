//! Repository for the `product_templates` and `product_template_values`
//! tables.

use catalog_core::error::CoreError;
use catalog_core::product_template::{
    plan_value_update, validate_values, FieldSchema, FieldValueInput,
};
use catalog_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::ReconcileError;
use crate::models::product_template::{
    ProductTemplate, ProductTemplateDetail, ProductTemplateValueDetail,
};
use crate::models::template::TemplateField;
use crate::repositories::template_repo::FIELD_COLUMNS;

/// Column list for the `product_templates` table.
const COLUMNS: &str = "id, template_id, created_at, updated_at";

/// Provides binding and value reconciliation for product template instances.
pub struct ProductTemplateRepo;

impl ProductTemplateRepo {
    /// Create an instance for a product that has none, with one value row
    /// per submitted value, and point the product at it.
    ///
    /// Values are checked against the template's fields as read under a
    /// share lock on the template row, so a concurrent template edit cannot
    /// slip in between validation and insert. Returns `None` (and writes
    /// nothing) if the product does not exist or is already bound.
    pub async fn create_for_product(
        pool: &PgPool,
        product_id: DbId,
        template_id: DbId,
        values: &[FieldValueInput],
    ) -> Result<Option<ProductTemplate>, ReconcileError> {
        let mut tx = pool.begin().await?;

        let schema = Self::lock_schema(&mut tx, template_id).await?;
        validate_values(&schema, values)?;

        let query = format!(
            "INSERT INTO product_templates (template_id) VALUES ($1) RETURNING {COLUMNS}"
        );
        let instance = sqlx::query_as::<_, ProductTemplate>(&query)
            .bind(template_id)
            .fetch_one(&mut *tx)
            .await?;

        let linked = sqlx::query(
            "UPDATE products SET product_template_id = $2 \
             WHERE id = $1 AND product_template_id IS NULL",
        )
        .bind(product_id)
        .bind(instance.id)
        .execute(&mut *tx)
        .await?;

        if linked.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        for value in values {
            Self::insert_value(&mut tx, instance.id, value).await?;
        }

        tx.commit().await?;
        Ok(Some(instance))
    }

    /// Find an instance by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProductTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM product_templates WHERE id = $1");
        sqlx::query_as::<_, ProductTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Instance with template name and values joined to their fields, in
    /// field display order.
    pub async fn find_detail(
        pool: &PgPool,
        instance_id: DbId,
    ) -> Result<Option<ProductTemplateDetail>, sqlx::Error> {
        let Some(instance) = Self::find_by_id(pool, instance_id).await? else {
            return Ok(None);
        };

        let template_name: String = sqlx::query_scalar("SELECT name FROM templates WHERE id = $1")
            .bind(instance.template_id)
            .fetch_one(pool)
            .await?;

        let values = sqlx::query_as::<_, ProductTemplateValueDetail>(
            "SELECT v.field_id, f.name, f.field_type, f.options, v.value \
             FROM product_template_values v \
             JOIN template_fields f ON f.id = v.field_id \
             WHERE v.product_template_id = $1 \
             ORDER BY f.sort_order, f.id",
        )
        .bind(instance_id)
        .fetch_all(pool)
        .await?;

        Ok(Some(ProductTemplateDetail {
            instance,
            template_name,
            values,
        }))
    }

    /// Reconcile an instance's values with its template's current fields,
    /// optionally switching it to `template_id` first, all in one
    /// transaction.
    ///
    /// The instance row is locked and the template's fields and the stored
    /// values are read inside the transaction, so the plan always matches
    /// what is committed. Returns `None` if no instance with the given `id`
    /// exists.
    pub async fn reconcile(
        pool: &PgPool,
        id: DbId,
        template_id: Option<DbId>,
        values: Vec<FieldValueInput>,
    ) -> Result<Option<ProductTemplate>, ReconcileError> {
        let mut tx = pool.begin().await?;

        let current: Option<DbId> =
            sqlx::query_scalar("SELECT template_id FROM product_templates WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(current) = current else {
            tx.rollback().await?;
            return Ok(None);
        };
        let template_id = template_id.unwrap_or(current);

        let schema = Self::lock_schema(&mut tx, template_id).await?;
        let existing: Vec<DbId> = sqlx::query_scalar(
            "SELECT field_id FROM product_template_values WHERE product_template_id = $1",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        let plan = plan_value_update(&schema, &existing, values)?;

        let query = format!(
            "UPDATE product_templates SET template_id = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        let instance = sqlx::query_as::<_, ProductTemplate>(&query)
            .bind(id)
            .bind(template_id)
            .fetch_one(&mut *tx)
            .await?;

        if !plan.deletes.is_empty() {
            sqlx::query(
                "DELETE FROM product_template_values \
                 WHERE product_template_id = $1 AND field_id = ANY($2)",
            )
            .bind(id)
            .bind(&plan.deletes)
            .execute(&mut *tx)
            .await?;
        }

        for update in &plan.updates {
            sqlx::query(
                "UPDATE product_template_values SET value = $3 \
                 WHERE product_template_id = $1 AND field_id = $2",
            )
            .bind(id)
            .bind(update.id)
            .bind(&update.item.value)
            .execute(&mut *tx)
            .await?;
        }

        for create in &plan.creates {
            Self::insert_value(&mut tx, id, &create.item).await?;
        }

        tx.commit().await?;

        tracing::debug!(
            product_template_id = id,
            template_id,
            updated = plan.updates.len(),
            created = plan.creates.len(),
            deleted = plan.deletes.len(),
            "Product template values reconciled",
        );
        Ok(Some(instance))
    }

    /// Delete the instance bound to a product; values cascade and the
    /// product's reference is cleared.
    pub async fn delete_for_product(pool: &PgPool, product_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM product_templates \
             WHERE id = (SELECT product_template_id FROM products WHERE id = $1)",
        )
        .bind(product_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Share-lock a template row and read its fields as a value schema.
    /// Template edits take the row exclusively, so the fields cannot change
    /// until the caller's transaction ends.
    async fn lock_schema(
        tx: &mut Transaction<'_, Postgres>,
        template_id: DbId,
    ) -> Result<Vec<FieldSchema>, ReconcileError> {
        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM templates WHERE id = $1 FOR SHARE")
                .bind(template_id)
                .fetch_optional(&mut **tx)
                .await?;
        if locked.is_none() {
            return Err(CoreError::NotFound {
                entity: "Template",
                id: template_id,
            }
            .into());
        }

        let query = format!(
            "SELECT {FIELD_COLUMNS} FROM template_fields \
             WHERE template_id = $1 \
             ORDER BY sort_order, id"
        );
        let fields = sqlx::query_as::<_, TemplateField>(&query)
            .bind(template_id)
            .fetch_all(&mut **tx)
            .await?;
        Ok(fields
            .iter()
            .map(TemplateField::schema)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn insert_value(
        tx: &mut Transaction<'_, Postgres>,
        instance_id: DbId,
        value: &FieldValueInput,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO product_template_values (product_template_id, field_id, value) \
             VALUES ($1, $2, $3)",
        )
        .bind(instance_id)
        .bind(value.field_id)
        .bind(&value.value)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
