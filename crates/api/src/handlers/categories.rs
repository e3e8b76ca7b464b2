//! Handlers for the `/categories` resource.
//!
//! Categories form a fixed four-rank tree. Every row carries its full
//! ancestor chain, derived here from the immediate parent.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use catalog_core::category::{
    derive_parent_refs, CategoryNode, CategoryPath, CategoryRank, CategorySelection, ParentRefs,
    SelectionState,
};
use catalog_core::types::DbId;
use catalog_db::models::category::{Category, CreateCategory, UpdateCategory};
use catalog_db::repositories::CategoryRepo;
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::query::{CascadeParams, CategoryListParams};
use crate::response::ActionResponse;
use crate::state::AppState;

/// Response body for the cascading picker.
#[derive(Debug, Serialize)]
pub struct CascadeView {
    pub state: SelectionState,
    pub path: CategoryPath,
    /// Rank the next choice is made at; `None` once quaternary is chosen.
    pub next_rank: Option<CategoryRank>,
    /// Candidates for `next_rank` under the current selection.
    pub options: Vec<Category>,
}

async fn ensure_category_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<Category> {
    CategoryRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::not_found("Category", id))
}

/// Load the immediate parent named in `supplied`, if any.
async fn load_parent(
    pool: &sqlx::PgPool,
    rank: CategoryRank,
    supplied: &ParentRefs,
) -> AppResult<Option<CategoryNode>> {
    match supplied.immediate(rank) {
        Some(parent_id) => Ok(Some(ensure_category_exists(pool, parent_id).await?.node()?)),
        None => Ok(None),
    }
}

/// Check a product or brand category path against the stored tree.
pub(crate) async fn check_category_path(pool: &sqlx::PgPool, path: &CategoryPath) -> AppResult<()> {
    path.validate_contiguous()?;
    let ids = path.ids();
    if ids.is_empty() {
        return Ok(());
    }
    let nodes = CategoryRepo::find_many(pool, &ids)
        .await?
        .iter()
        .map(Category::node)
        .collect::<Result<Vec<_>, _>>()?;
    path.validate_against(&nodes)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/categories?category_type=&parent_id=
pub async fn list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<CategoryListParams>,
) -> AppResult<impl IntoResponse> {
    let categories = CategoryRepo::list(&state.pool, params.category_type, params.parent_id).await?;
    Ok(Json(ActionResponse::ok(
        "Categories loaded",
        categories,
    )))
}

/// GET /api/v1/categories/cascade?primary_category_id=&secondary_category_id=&...
///
/// Replay a picker's selection top-down and return its state with the
/// candidates for the next rank. A rank chosen without the one above it
/// is rejected.
pub async fn cascade(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<CascadeParams>,
) -> AppResult<impl IntoResponse> {
    let submitted = CategoryPath {
        primary_category_id: params.primary_category_id,
        secondary_category_id: params.secondary_category_id,
        tertiary_category_id: params.tertiary_category_id,
        quaternary_category_id: params.quaternary_category_id,
    };

    let mut selection = CategorySelection::new();
    for rank in CategoryRank::ALL {
        if let Some(id) = submitted.get(rank) {
            selection.select(rank, id)?;
        }
    }
    check_category_path(&state.pool, &selection.path()).await?;

    let next_rank = match selection.deepest() {
        None => Some(CategoryRank::Primary),
        Some(rank) => rank.child(),
    };
    let options = match next_rank {
        Some(rank) => {
            CategoryRepo::list(&state.pool, Some(rank), selection.parent_for(rank)).await?
        }
        None => Vec::new(),
    };

    let view = CascadeView {
        state: selection.state(),
        path: selection.path(),
        next_rank,
        options,
    };
    Ok(Json(ActionResponse::ok("Category selection resolved", view)))
}

/// POST /api/v1/categories
///
/// A non-primary category names its immediate parent; the rest of the
/// chain is copied from that parent.
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateCategory>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let rank = input.category_type;
    let parent = load_parent(&state.pool, rank, &input.parents).await?;
    let refs = derive_parent_refs(rank, input.parents, parent.as_ref())?;

    let category = CategoryRepo::create(&state.pool, &input.name, rank, &refs).await?;

    tracing::info!(
        category_id = category.id,
        rank = %rank,
        "Category created",
    );

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::ok("Category created", category)),
    ))
}

/// GET /api/v1/categories/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let category = ensure_category_exists(&state.pool, id).await?;
    Ok(Json(ActionResponse::ok("Category loaded", category)))
}

/// PUT /api/v1/categories/{id}
///
/// Rename and/or move under a different parent of the same rank. The rank
/// itself is fixed. Moving rewrites the chain on descendants and on every
/// product and brand path through this category.
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateCategory>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let existing = ensure_category_exists(&state.pool, id).await?;
    let rank = existing.rank()?;

    let supplied = if input.parents == ParentRefs::default() {
        existing.parents()
    } else {
        input.parents
    };
    let parent = load_parent(&state.pool, rank, &supplied).await?;
    let refs = derive_parent_refs(rank, supplied, parent.as_ref())?;

    let category = CategoryRepo::update(
        &state.pool,
        id,
        rank,
        input.name.as_deref().map(str::trim),
        &refs,
    )
    .await?
    .ok_or(AppError::not_found("Category", id))?;

    tracing::info!(
        category_id = id,
        moved = refs != existing.parents(),
        "Category updated",
    );

    Ok(Json(ActionResponse::ok("Category updated", category)))
}

/// DELETE /api/v1/categories/{id}
///
/// Refused with 409 while child categories, products or brands reference it.
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    if !CategoryRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Category", id));
    }
    tracing::info!(category_id = id, "Category deleted");
    Ok(Json(ActionResponse::done("Category deleted")))
}
