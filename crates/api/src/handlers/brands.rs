//! Handlers for the `/brands` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use catalog_core::types::DbId;
use catalog_db::models::brand::{Brand, CreateBrand, UpdateBrand};
use catalog_db::repositories::BrandRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::categories::check_category_path;
use crate::response::ActionResponse;
use crate::state::AppState;

pub(crate) async fn ensure_brand_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<Brand> {
    BrandRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::not_found("Brand", id))
}

/// GET /api/v1/brands
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let brands = BrandRepo::list(&state.pool).await?;
    Ok(Json(ActionResponse::ok("Brands loaded", brands)))
}

/// POST /api/v1/brands
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateBrand>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    check_category_path(&state.pool, &input.categories).await?;

    let brand = BrandRepo::create(&state.pool, &input).await?;
    tracing::info!(brand_id = brand.id, "Brand created");

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::ok("Brand created", brand)),
    ))
}

/// GET /api/v1/brands/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let brand = ensure_brand_exists(&state.pool, id).await?;
    Ok(Json(ActionResponse::ok("Brand loaded", brand)))
}

/// PUT /api/v1/brands/{id}
///
/// Omitted fields are kept; a supplied `categories` path replaces the
/// stored one.
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateBrand>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    if let Some(path) = &input.categories {
        check_category_path(&state.pool, path).await?;
    }

    let brand = BrandRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Brand", id))?;
    tracing::info!(brand_id = id, "Brand updated");

    Ok(Json(ActionResponse::ok("Brand updated", brand)))
}

/// DELETE /api/v1/brands/{id}
///
/// Products of the brand remain, unbranded.
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    if !BrandRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Brand", id));
    }
    tracing::info!(brand_id = id, "Brand deleted");
    Ok(Json(ActionResponse::done("Brand deleted")))
}
