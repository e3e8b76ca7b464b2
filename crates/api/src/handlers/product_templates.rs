//! Handlers binding templates to products and reconciling their values.
//!
//! A product has at most one template instance. The instance holds exactly
//! one value per field of its template; every write is checked against the
//! template's current fields before anything is stored.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use catalog_core::error::CoreError;
use catalog_core::types::DbId;
use catalog_db::models::product_template::{
    BindProductTemplate, ProductTemplateDetail, RebindProductTemplate,
};
use catalog_db::repositories::ProductTemplateRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::products::ensure_product_exists;
use crate::response::ActionResponse;
use crate::state::AppState;

async fn load_detail(pool: &sqlx::PgPool, instance_id: DbId) -> AppResult<ProductTemplateDetail> {
    ProductTemplateRepo::find_detail(pool, instance_id)
        .await?
        .ok_or(AppError::not_found("ProductTemplate", instance_id))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/products/{id}/template
///
/// The product's instance with each value joined to its field, or `null`
/// data when the product has none.
pub async fn get_for_product(
    State(state): State<AppState>,
    AppPath(product_id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let product = ensure_product_exists(&state.pool, product_id).await?;

    let detail = match product.product_template_id {
        Some(instance_id) => Some(load_detail(&state.pool, instance_id).await?),
        None => None,
    };
    let message = if detail.is_some() {
        "Product template loaded"
    } else {
        "Product has no template"
    };
    Ok(Json(ActionResponse::ok(message, detail)))
}

/// POST /api/v1/products/{id}/template
///
/// Bind a product that has no template yet, storing one value per field.
pub async fn bind(
    State(state): State<AppState>,
    AppPath(product_id): AppPath<DbId>,
    AppJson(input): AppJson<BindProductTemplate>,
) -> AppResult<impl IntoResponse> {
    let product = ensure_product_exists(&state.pool, product_id).await?;
    if product.product_template_id.is_some() {
        return Err(already_bound(product_id));
    }

    let instance = ProductTemplateRepo::create_for_product(
        &state.pool,
        product_id,
        input.template_id,
        &input.values,
    )
    .await?
    // Lost a race with another bind, or the product was deleted.
    .ok_or_else(|| already_bound(product_id))?;

    tracing::info!(
        product_id,
        product_template_id = instance.id,
        template_id = input.template_id,
        value_count = input.values.len(),
        "Product bound to template",
    );

    let detail = load_detail(&state.pool, instance.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::ok("Product template saved", detail)),
    ))
}

/// PUT /api/v1/product-templates/{id}
///
/// Reconcile an instance's values with the template's current fields:
/// matched values are updated, values for new fields created, values for
/// removed fields deleted. Supplying a different `template_id` switches
/// the instance to that template first.
pub async fn rebind(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<RebindProductTemplate>,
) -> AppResult<impl IntoResponse> {
    let value_count = input.values.len();
    let instance = ProductTemplateRepo::reconcile(&state.pool, id, input.template_id, input.values)
        .await?
        .ok_or(AppError::not_found("ProductTemplate", id))?;

    tracing::info!(
        product_template_id = id,
        template_id = instance.template_id,
        value_count,
        "Product template values saved",
    );

    let detail = load_detail(&state.pool, id).await?;
    Ok(Json(ActionResponse::ok("Product template saved", detail)))
}

/// DELETE /api/v1/products/{id}/template
///
/// Drop the product's instance and its values. Unbinding a product with no
/// template succeeds without change.
pub async fn unbind(
    State(state): State<AppState>,
    AppPath(product_id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_product_exists(&state.pool, product_id).await?;

    if !ProductTemplateRepo::delete_for_product(&state.pool, product_id).await? {
        return Ok(Json(ActionResponse::done("Product has no template")));
    }
    tracing::info!(product_id, "Product template removed");
    Ok(Json(ActionResponse::done("Product template removed")))
}

fn already_bound(product_id: DbId) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "Product {product_id} already has a template; update it instead"
    )))
}
