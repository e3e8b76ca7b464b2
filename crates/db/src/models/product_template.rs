//! Product template instance models and DTOs.
//!
//! An instance binds one product to one template and holds one value row
//! per field of that template.

use catalog_core::product_template::FieldValueInput;
use catalog_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `product_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductTemplate {
    pub id: DbId,
    pub template_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `product_template_values` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductTemplateValue {
    pub id: DbId,
    pub product_template_id: DbId,
    pub field_id: DbId,
    pub value: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A stored value joined to its field definition.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductTemplateValueDetail {
    pub field_id: DbId,
    pub name: String,
    pub field_type: String,
    pub options: Option<Vec<String>>,
    pub value: String,
}

/// An instance with its template name and joined values.
#[derive(Debug, Clone, Serialize)]
pub struct ProductTemplateDetail {
    #[serde(flatten)]
    pub instance: ProductTemplate,
    pub template_name: String,
    pub values: Vec<ProductTemplateValueDetail>,
}

/// DTO for binding a product to a template for the first time.
#[derive(Debug, Clone, Deserialize)]
pub struct BindProductTemplate {
    pub template_id: DbId,
    #[serde(default)]
    pub values: Vec<FieldValueInput>,
}

/// DTO for re-saving an instance's values.
#[derive(Debug, Clone, Deserialize)]
pub struct RebindProductTemplate {
    /// Switches the instance to another template when it differs.
    pub template_id: Option<DbId>,
    #[serde(default)]
    pub values: Vec<FieldValueInput>,
}
