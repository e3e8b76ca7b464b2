//! Repository for the `templates` and `template_fields` tables.

use catalog_core::template::{plan_field_update, FieldDraft, FieldSpec};
use catalog_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::ReconcileError;
use crate::models::status::{StatusId, TemplateStatus};
use crate::models::template::{Template, TemplateField, TemplateHeader, TemplateWithFields};

/// Column list for the `templates` table.
const COLUMNS: &str = "id, name, description, status_id, version, created_at, updated_at";

/// Column list for the `template_fields` table.
pub(crate) const FIELD_COLUMNS: &str =
    "id, template_id, name, field_type, options, sort_order, created_at, updated_at";

/// Provides CRUD operations for templates and field reconciliation.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a template and one field row per spec, in one transaction.
    pub async fn create(
        pool: &PgPool,
        header: &TemplateHeader,
        fields: &[FieldSpec],
    ) -> Result<TemplateWithFields, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO templates (name, description, status_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        let template = sqlx::query_as::<_, Template>(&query)
            .bind(&header.name)
            .bind(&header.description)
            .bind(header.status_id.unwrap_or(TemplateStatus::Draft.id()))
            .fetch_one(&mut *tx)
            .await?;

        let mut created = Vec::with_capacity(fields.len());
        for (position, spec) in fields.iter().enumerate() {
            created.push(Self::insert_field(&mut tx, template.id, spec, position).await?);
        }

        tx.commit().await?;
        Ok(TemplateWithFields {
            template,
            fields: created,
        })
    }

    /// Find a template by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE id = $1");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a template by ID, enriched with its ordered fields.
    pub async fn find_with_fields(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TemplateWithFields>, sqlx::Error> {
        match Self::find_by_id(pool, id).await? {
            Some(template) => {
                let fields = Self::list_fields(pool, template.id).await?;
                Ok(Some(TemplateWithFields { template, fields }))
            }
            None => Ok(None),
        }
    }

    /// List templates, optionally restricted to one status, newest first.
    pub async fn list(
        pool: &PgPool,
        status_id: Option<StatusId>,
    ) -> Result<Vec<Template>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM templates \
             WHERE ($1::SMALLINT IS NULL OR status_id = $1) \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(status_id)
            .fetch_all(pool)
            .await
    }

    /// Fields of a template in display order.
    pub async fn list_fields(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<Vec<TemplateField>, sqlx::Error> {
        let query = format!(
            "SELECT {FIELD_COLUMNS} FROM template_fields \
             WHERE template_id = $1 \
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, TemplateField>(&query)
            .bind(template_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a full-form edit: header columns plus field reconciliation, all
    /// in one transaction. Bumps `version`.
    ///
    /// The template row is locked and its current field ids are read inside
    /// the transaction; the plan is computed against those, so the stored
    /// field list ends up exactly as submitted even if fields changed since
    /// the caller last looked. Returns `None` if no template with the given
    /// `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        header: &TemplateHeader,
        drafts: Vec<FieldDraft>,
    ) -> Result<Option<Template>, ReconcileError> {
        let mut tx = pool.begin().await?;

        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM templates WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let current: Vec<DbId> = sqlx::query_scalar(
            "SELECT id FROM template_fields WHERE template_id = $1 ORDER BY sort_order, id",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        let plan = plan_field_update(&current, drafts)?;

        let query = format!(
            "UPDATE templates SET \
                name = $2, \
                description = $3, \
                status_id = COALESCE($4, status_id), \
                version = version + 1 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let template = sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(&header.name)
            .bind(&header.description)
            .bind(header.status_id)
            .fetch_one(&mut *tx)
            .await?;

        if !plan.deletes.is_empty() {
            sqlx::query("DELETE FROM template_fields WHERE template_id = $1 AND id = ANY($2)")
                .bind(id)
                .bind(&plan.deletes)
                .execute(&mut *tx)
                .await?;
        }

        for update in &plan.updates {
            sqlx::query(
                "UPDATE template_fields SET \
                    name = $3, field_type = $4, options = $5, sort_order = $6 \
                 WHERE id = $1 AND template_id = $2",
            )
            .bind(update.id)
            .bind(id)
            .bind(&update.item.name)
            .bind(update.item.field_type.as_str())
            .bind(&update.item.options)
            .bind(update.position as i32)
            .execute(&mut *tx)
            .await?;
        }

        for create in &plan.creates {
            Self::insert_field(&mut tx, id, &create.item, create.position).await?;
        }

        tx.commit().await?;

        tracing::debug!(
            template_id = id,
            updated = plan.updates.len(),
            created = plan.creates.len(),
            deleted = plan.deletes.len(),
            "Template fields reconciled",
        );
        Ok(Some(template))
    }

    /// Delete a template; its fields cascade.
    ///
    /// Fails with a foreign-key violation while a product instance still
    /// references it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn insert_field(
        tx: &mut Transaction<'_, Postgres>,
        template_id: DbId,
        spec: &FieldSpec,
        position: usize,
    ) -> Result<TemplateField, sqlx::Error> {
        let query = format!(
            "INSERT INTO template_fields (template_id, name, field_type, options, sort_order) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {FIELD_COLUMNS}"
        );
        sqlx::query_as::<_, TemplateField>(&query)
            .bind(template_id)
            .bind(&spec.name)
            .bind(spec.field_type.as_str())
            .bind(&spec.options)
            .bind(position as i32)
            .fetch_one(&mut **tx)
            .await
    }
}
