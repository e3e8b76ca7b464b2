//! Template field schema: field types, option lists, and the checks a
//! submitted field list must pass before it is persisted.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::reconcile::{plan_by_id, ReconcilePlan};
use crate::types::DbId;

pub const FIELD_TYPE_TEXT: &str = "text";
pub const FIELD_TYPE_SELECT: &str = "select";

pub const VALID_FIELD_TYPES: &[&str] = &[FIELD_TYPE_TEXT, FIELD_TYPE_SELECT];

/// The input control a field renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[serde(alias = "TEXT")]
    Text,
    #[serde(alias = "SELECT")]
    Select,
}

impl FieldType {
    /// String representation used in the `template_fields.field_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => FIELD_TYPE_TEXT,
            Self::Select => FIELD_TYPE_SELECT,
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            FIELD_TYPE_TEXT => Ok(Self::Text),
            FIELD_TYPE_SELECT => Ok(Self::Select),
            _ => Err(CoreError::Validation(format!(
                "Invalid field_type '{s}'. Must be one of: {}",
                VALID_FIELD_TYPES.join(", ")
            ))),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options as submitted: either a JSON list or one comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldOptions {
    List(Vec<String>),
    Csv(String),
}

impl FieldOptions {
    /// Trimmed, non-empty entries in submission order.
    pub fn normalized(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Self::List(items) => items.iter().map(String::as_str).collect(),
            Self::Csv(s) => s.split(',').collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// One field entry of a create/update template submission.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FieldDraft {
    /// Present when editing an existing field definition.
    #[serde(default)]
    pub id: Option<DbId>,
    #[serde(deserialize_with = "crate::types::trimmed")]
    #[validate(length(min = 1, message = "field name is required"))]
    pub name: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub options: Option<FieldOptions>,
}

/// A field entry after normalization, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub id: Option<DbId>,
    pub name: String,
    pub field_type: FieldType,
    /// `Some` only for select fields, and then never empty.
    pub options: Option<Vec<String>>,
}

/// Validate and normalize a full field list.
///
/// Rejects an empty list, blank names, names repeated within the list,
/// select fields without options, and repeated options. Text fields have
/// any submitted options dropped.
pub fn prepare_fields(drafts: Vec<FieldDraft>) -> Result<Vec<FieldSpec>, CoreError> {
    if drafts.is_empty() {
        return Err(CoreError::field(
            "fields",
            "a template must have at least one field",
        ));
    }

    let mut names = HashSet::new();
    let mut specs = Vec::with_capacity(drafts.len());

    for (index, draft) in drafts.into_iter().enumerate() {
        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::field(
                format!("fields[{index}].name"),
                "field name is required",
            ));
        }
        if !names.insert(name.clone()) {
            return Err(CoreError::field(
                name,
                "field names must be unique within a template",
            ));
        }

        let options = match draft.field_type {
            FieldType::Text => None,
            FieldType::Select => {
                let options = draft
                    .options
                    .as_ref()
                    .map(FieldOptions::normalized)
                    .unwrap_or_default();
                if options.is_empty() {
                    return Err(CoreError::field(
                        name,
                        "select fields require at least one option",
                    ));
                }
                let mut seen = HashSet::new();
                if let Some(dup) = options.iter().find(|o| !seen.insert(o.as_str())) {
                    return Err(CoreError::field(
                        name,
                        format!("option '{dup}' is listed more than once"),
                    ));
                }
                Some(options)
            }
        };

        specs.push(FieldSpec {
            id: draft.id,
            name,
            field_type: draft.field_type,
            options,
        });
    }

    Ok(specs)
}

/// Validate a submission and diff it against the template's current field
/// ids: matched ids are updated, id-less entries created, the rest deleted.
pub fn plan_field_update(
    existing_ids: &[DbId],
    drafts: Vec<FieldDraft>,
) -> Result<ReconcilePlan<FieldSpec>, CoreError> {
    let specs = prepare_fields(drafts)?;
    plan_by_id(existing_ids, specs, |spec| spec.id, "TemplateField")
}
