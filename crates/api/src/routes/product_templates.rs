//! Route definitions for product template instances.

use axum::routing::put;
use axum::Router;

use crate::handlers::product_templates;
use crate::state::AppState;

/// Routes mounted at `/product-templates`.
///
/// ```text
/// PUT    /{id}              -> rebind
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", put(product_templates::rebind))
}
