//! Shared response envelope types for API handlers.
//!
//! Every action answers with `{ "success": true, "message": ..., "data": ... }`
//! on success; failures use the same shape with `success: false` (see
//! [`crate::error::AppError`]), so a form can render the message without
//! inspecting the status code.

use serde::Serialize;

/// Standard `{ "success", "message", "data" }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(ActionResponse::ok("Template created", template)))
/// ```
#[derive(Debug, Serialize)]
pub struct ActionResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ActionResponse<T> {
    /// Successful action carrying a payload.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ActionResponse<()> {
    /// Successful action with nothing to return (deletes).
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}
