use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Validation failure attributable to one named input field.
    #[error("Validation failed for '{field}': {message}")]
    FieldValidation { field: String, message: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::FieldValidation`].
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FieldValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<validator::ValidationErrors> for CoreError {
    /// Collapse `validator` output into a single error, naming the first
    /// offending field (nested paths are flattened to `fields[0].name`).
    fn from(errors: validator::ValidationErrors) -> Self {
        match first_violation(&errors, String::new()) {
            Some((field, message)) => Self::FieldValidation { field, message },
            None => Self::Validation("invalid input".to_string()),
        }
    }
}

fn first_violation(errors: &validator::ValidationErrors, prefix: String) -> Option<(String, String)> {
    use validator::ValidationErrorsKind;

    let mut keys: Vec<_> = errors.errors().keys().collect();
    keys.sort();

    for key in keys {
        let path = if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        };
        match &errors.errors()[key] {
            ValidationErrorsKind::Field(list) => {
                if let Some(err) = list.first() {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    return Some((path, message));
                }
            }
            ValidationErrorsKind::Struct(inner) => {
                if let Some(found) = first_violation(inner, path) {
                    return Some(found);
                }
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    if let Some(found) = first_violation(inner, format!("{path}[{index}]")) {
                        return Some(found);
                    }
                }
            }
        }
    }
    None
}
