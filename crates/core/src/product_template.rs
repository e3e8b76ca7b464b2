//! Product template values: checking submitted values against a template's
//! field schema and planning how stored value rows change.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::reconcile::{plan_by_key, ReconcilePlan};
use crate::template::FieldType;
use crate::types::DbId;

/// The parts of a field definition needed to validate or render a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    pub id: DbId,
    pub name: String,
    pub field_type: FieldType,
    /// Declared options; empty for text fields.
    pub options: Vec<String>,
}

/// One submitted `(field_id, value)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValueInput {
    pub field_id: DbId,
    pub value: String,
}

/// An unfilled value slot carrying enough schema to pick an input control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueSlot {
    pub field_id: DbId,
    pub name: String,
    pub field_type: FieldType,
    pub options: Vec<String>,
    pub value: String,
}

/// One empty slot per field, in schema order.
pub fn empty_slots(schema: &[FieldSchema]) -> Vec<ValueSlot> {
    schema
        .iter()
        .map(|field| ValueSlot {
            field_id: field.id,
            name: field.name.clone(),
            field_type: field.field_type,
            options: field.options.clone(),
            value: String::new(),
        })
        .collect()
}

/// Check that `values` supplies exactly one acceptable value per field.
///
/// - a `field_id` outside the schema is [`CoreError::NotFound`]
/// - a repeated `field_id` is a validation error
/// - a select value outside the declared options names the field
/// - a schema field without a value names the field
pub fn validate_values(schema: &[FieldSchema], values: &[FieldValueInput]) -> Result<(), CoreError> {
    let by_id: HashMap<DbId, &FieldSchema> = schema.iter().map(|f| (f.id, f)).collect();
    let mut seen = HashSet::new();

    for input in values {
        let field = by_id.get(&input.field_id).ok_or(CoreError::NotFound {
            entity: "TemplateField",
            id: input.field_id,
        })?;
        if !seen.insert(input.field_id) {
            return Err(CoreError::field(
                field.name.clone(),
                "a value was submitted more than once",
            ));
        }
        if field.field_type == FieldType::Select && !field.options.contains(&input.value) {
            return Err(CoreError::field(
                field.name.clone(),
                format!(
                    "'{}' is not one of: {}",
                    input.value,
                    field.options.join(", ")
                ),
            ));
        }
    }

    if let Some(missing) = schema.iter().find(|f| !seen.contains(&f.id)) {
        return Err(CoreError::field(missing.name.clone(), "a value is required"));
    }

    Ok(())
}

/// Validate `values` and diff them against the field ids that already have
/// a stored value row for this instance.
pub fn plan_value_update(
    schema: &[FieldSchema],
    existing_field_ids: &[DbId],
    values: Vec<FieldValueInput>,
) -> Result<ReconcilePlan<FieldValueInput>, CoreError> {
    validate_values(schema, &values)?;
    plan_by_key(existing_field_ids, values, |v| v.field_id, "TemplateField")
}
