//! Route definitions for products and their template binding.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{product_templates, products};
use crate::state::AppState;

/// Routes mounted at `/products`.
///
/// ```text
/// GET    /                  -> list
/// POST   /                  -> create
/// GET    /{id}              -> get_by_id
/// PUT    /{id}              -> update
/// DELETE /{id}              -> delete
/// POST   /{id}/stock        -> adjust_stock
/// PUT    /{id}/images       -> replace_images
/// GET    /{id}/template     -> product_templates::get_for_product
/// POST   /{id}/template     -> product_templates::bind
/// DELETE /{id}/template     -> product_templates::unbind
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            get(products::get_by_id)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/{id}/stock", post(products::adjust_stock))
        .route("/{id}/images", put(products::replace_images))
        .route(
            "/{id}/template",
            get(product_templates::get_for_product)
                .post(product_templates::bind)
                .delete(product_templates::unbind),
        )
}
