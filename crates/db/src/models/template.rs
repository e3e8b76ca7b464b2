//! Template and template field models and DTOs.
//!
//! A template is a named schema of typed attribute slots; its field rows
//! are owned by it and deleted with it.

use catalog_core::error::CoreError;
use catalog_core::product_template::FieldSchema;
use catalog_core::template::{FieldDraft, FieldType};
use catalog_core::types::{trimmed, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::status::StatusId;

/// A row from the `templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Template {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub status_id: StatusId,
    pub version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `template_fields` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TemplateField {
    pub id: DbId,
    pub template_id: DbId,
    pub name: String,
    pub field_type: String,
    pub options: Option<Vec<String>>,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TemplateField {
    /// Reduce the row to the schema used for value validation and rendering.
    pub fn schema(&self) -> Result<FieldSchema, CoreError> {
        Ok(FieldSchema {
            id: self.id,
            name: self.name.clone(),
            field_type: FieldType::parse(&self.field_type)?,
            options: self.options.clone().unwrap_or_default(),
        })
    }
}

/// A template together with its ordered field definitions.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateWithFields {
    #[serde(flatten)]
    pub template: Template,
    pub fields: Vec<TemplateField>,
}

impl TemplateWithFields {
    pub fn schema(&self) -> Result<Vec<FieldSchema>, CoreError> {
        self.fields.iter().map(TemplateField::schema).collect()
    }
}

/// DTO for creating a template together with its fields.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTemplate {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: Option<String>,
    /// Defaults to 1 (Draft) if omitted.
    pub status_id: Option<StatusId>,
    #[validate(nested)]
    #[serde(default)]
    pub fields: Vec<FieldDraft>,
}

/// DTO for a full-form template edit.
///
/// `fields` is the complete desired field list: entries with an `id` edit
/// that field, entries without one add a field, and existing fields not
/// listed are removed.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTemplate {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: Option<String>,
    /// Leaves the status unchanged if omitted.
    pub status_id: Option<StatusId>,
    #[validate(nested)]
    #[serde(default)]
    pub fields: Vec<FieldDraft>,
}

/// Normalized template columns written by create and update.
#[derive(Debug, Clone)]
pub struct TemplateHeader {
    pub name: String,
    pub description: Option<String>,
    pub status_id: Option<StatusId>,
}
