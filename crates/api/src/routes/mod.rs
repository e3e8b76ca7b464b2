pub mod brands;
pub mod categories;
pub mod health;
pub mod product_templates;
pub mod products;
pub mod templates;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /templates                                       list, create
/// /templates/{id}                                  get, update (reconcile), delete
/// /templates/{id}/instance                         empty value slots
///
/// /categories                                      list (?category_type=&parent_id=), create
/// /categories/cascade                              cascading picker state
/// /categories/{id}                                 get, update, delete
///
/// /brands                                          list, create
/// /brands/{id}                                     get, update, delete
///
/// /products                                        list (paged, sorted, filtered), create
/// /products/{id}                                   get, update, delete
/// /products/{id}/stock                             adjust stock (POST)
/// /products/{id}/images                            replace images (PUT)
/// /products/{id}/template                          get, bind (POST), unbind (DELETE)
///
/// /product-templates/{id}                          rebind values (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/templates", templates::router())
        .nest("/categories", categories::router())
        .nest("/brands", brands::router())
        .nest("/products", products::router())
        .nest("/product-templates", product_templates::router())
}
