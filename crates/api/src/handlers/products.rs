//! Handlers for the `/products` resource.
//!
//! Products carry a brand, a category path, an image list and a stock
//! level. Template binding lives in
//! [`product_templates`](crate::handlers::product_templates).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use catalog_core::category::CategoryPath;
use catalog_core::error::CoreError;
use catalog_core::listing::{clamp_limit, clamp_offset, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use catalog_core::types::DbId;
use catalog_core::upload::{completed_urls, ensure_settled, UploadState};
use catalog_db::models::product::{CreateProduct, Product, ProductFilter, UpdateProduct};
use catalog_db::repositories::ProductRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::brands::ensure_brand_exists;
use crate::handlers::categories::check_category_path;
use crate::query::ProductListParams;
use crate::response::ActionResponse;
use crate::state::AppState;

/// Request body for `POST /products/{id}/stock`.
#[derive(Debug, Deserialize)]
pub struct StockAdjustment {
    /// Units to add (positive) or remove (negative).
    pub delta: i32,
}

/// Request body for `PUT /products/{id}/images`.
#[derive(Debug, Deserialize)]
pub struct ImageUploads {
    pub uploads: Vec<UploadState>,
}

pub(crate) async fn ensure_product_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<Product> {
    ProductRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::not_found("Product", id))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/products?limit=&offset=&sort=&order=&brand_id=&primary_category_id=...
pub async fn list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ProductListParams>,
) -> AppResult<impl IntoResponse> {
    let filter = ProductFilter {
        brand_id: params.brand_id,
        categories: CategoryPath {
            primary_category_id: params.primary_category_id,
            secondary_category_id: params.secondary_category_id,
            tertiary_category_id: params.tertiary_category_id,
            quaternary_category_id: params.quaternary_category_id,
        },
        sort: params.sort,
        order: params.order,
        limit: clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE),
        offset: clamp_offset(params.offset),
    };
    let page = ProductRepo::list(&state.pool, &filter).await?;
    Ok(Json(ActionResponse::ok("Products loaded", page)))
}

/// POST /api/v1/products
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateProduct>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    if let Some(brand_id) = input.brand_id {
        ensure_brand_exists(&state.pool, brand_id).await?;
    }
    check_category_path(&state.pool, &input.categories).await?;

    let product = ProductRepo::create(&state.pool, &input).await?;
    tracing::info!(product_id = product.id, sku = %product.sku, "Product created");

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::ok("Product created", product)),
    ))
}

/// GET /api/v1/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let product = ensure_product_exists(&state.pool, id).await?;
    Ok(Json(ActionResponse::ok("Product loaded", product)))
}

/// PUT /api/v1/products/{id}
///
/// Omitted fields are kept; `null` clears `description` or `brand_id`; a
/// supplied `categories` path replaces the stored one. Stock is changed
/// through the stock endpoint only.
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateProduct>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    if let Some(Some(brand_id)) = input.brand_id {
        ensure_brand_exists(&state.pool, brand_id).await?;
    }
    if let Some(path) = &input.categories {
        check_category_path(&state.pool, path).await?;
    }

    let product = ProductRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Product", id))?;
    tracing::info!(product_id = id, "Product updated");

    Ok(Json(ActionResponse::ok("Product updated", product)))
}

/// DELETE /api/v1/products/{id}
///
/// The product's template instance and its values go with it.
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    if !ProductRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Product", id));
    }
    tracing::info!(product_id = id, "Product deleted");
    Ok(Json(ActionResponse::done("Product deleted")))
}

/// POST /api/v1/products/{id}/stock
///
/// Add `delta` units. A change that would leave negative stock, or more than
/// an INTEGER can hold, is rejected and nothing is written.
pub async fn adjust_stock(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<StockAdjustment>,
) -> AppResult<impl IntoResponse> {
    let current = ensure_product_exists(&state.pool, id).await?;

    let Some(product) = ProductRepo::adjust_stock(&state.pool, id, input.delta).await? else {
        let message = if input.delta < 0 {
            format!(
                "cannot remove {} unit(s); {} in stock",
                input.delta.unsigned_abs(),
                current.stock_quantity
            )
        } else {
            format!(
                "cannot add {} unit(s); stock is capped at {}",
                input.delta,
                i32::MAX
            )
        };
        return Err(AppError::Core(CoreError::field("delta", message)));
    };

    tracing::info!(
        product_id = id,
        delta = input.delta,
        stock_quantity = product.stock_quantity,
        "Stock adjusted",
    );

    Ok(Json(ActionResponse::ok("Stock adjusted", product)))
}

/// PUT /api/v1/products/{id}/images
///
/// Replace the image list with the URLs of the completed uploads. Failed
/// uploads are skipped; any upload still running rejects the request.
pub async fn replace_images(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<ImageUploads>,
) -> AppResult<impl IntoResponse> {
    ensure_settled(&input.uploads)?;
    let urls = completed_urls(&input.uploads);

    let product = ProductRepo::replace_images(&state.pool, id, &urls)
        .await?
        .ok_or(AppError::not_found("Product", id))?;
    tracing::info!(product_id = id, image_count = urls.len(), "Product images replaced");

    Ok(Json(ActionResponse::ok("Images saved", product)))
}
