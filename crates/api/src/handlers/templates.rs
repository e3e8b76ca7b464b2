//! Handlers for the `/templates` resource.
//!
//! A template is a named list of typed fields. Edits are full-form: the
//! submitted field list replaces the stored one via reconciliation.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use catalog_core::error::CoreError;
use catalog_core::product_template::empty_slots;
use catalog_core::template::prepare_fields;
use catalog_core::types::DbId;
use catalog_db::models::status::{StatusId, TemplateStatus};
use catalog_db::models::template::{CreateTemplate, TemplateHeader, TemplateWithFields, UpdateTemplate};
use catalog_db::repositories::TemplateRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::query::TemplateListParams;
use crate::response::ActionResponse;
use crate::state::AppState;

async fn ensure_template_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<TemplateWithFields> {
    TemplateRepo::find_with_fields(pool, id)
        .await?
        .ok_or(AppError::not_found("Template", id))
}

fn check_status(status_id: Option<StatusId>) -> AppResult<()> {
    match status_id {
        Some(id) if TemplateStatus::from_id(id).is_none() => Err(AppError::Core(
            CoreError::field("status_id", format!("unknown template status {id}")),
        )),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/templates?status_id=
pub async fn list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<TemplateListParams>,
) -> AppResult<impl IntoResponse> {
    let templates = TemplateRepo::list(&state.pool, params.status_id).await?;
    Ok(Json(ActionResponse::ok(
        "Templates loaded",
        templates,
    )))
}

/// POST /api/v1/templates
///
/// Create a template with at least one field. Nothing is written when any
/// field is invalid.
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateTemplate>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    check_status(input.status_id)?;
    let specs = prepare_fields(input.fields)?;

    let header = TemplateHeader {
        name: input.name,
        description: input.description,
        status_id: input.status_id,
    };
    let template = TemplateRepo::create(&state.pool, &header, &specs).await?;

    tracing::info!(
        template_id = template.template.id,
        field_count = template.fields.len(),
        "Template created",
    );

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::ok("Template created", template)),
    ))
}

/// GET /api/v1/templates/{id}
///
/// A template with its fields in display order.
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = ensure_template_exists(&state.pool, id).await?;
    Ok(Json(ActionResponse::ok("Template loaded", template)))
}

/// PUT /api/v1/templates/{id}
///
/// Full-form edit. Fields carrying an `id` are updated in place, fields
/// without one are created, stored fields missing from the list are
/// deleted; all in one transaction.
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateTemplate>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    check_status(input.status_id)?;

    let header = TemplateHeader {
        name: input.name,
        description: input.description,
        status_id: input.status_id,
    };
    let field_count = input.fields.len();
    let template = TemplateRepo::update(&state.pool, id, &header, input.fields)
        .await?
        .ok_or(AppError::not_found("Template", id))?;

    tracing::info!(
        template_id = id,
        version = template.version,
        field_count,
        "Template updated",
    );

    let template = ensure_template_exists(&state.pool, id).await?;
    Ok(Json(ActionResponse::ok("Template updated", template)))
}

/// DELETE /api/v1/templates/{id}
///
/// Fields go with the template. Refused with 409 while any product is
/// still bound to it.
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    if !TemplateRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Template", id));
    }
    tracing::info!(template_id = id, "Template deleted");
    Ok(Json(ActionResponse::done("Template deleted")))
}

/// GET /api/v1/templates/{id}/instance
///
/// One empty value slot per field, carrying the field's name, type and
/// options so a form can render the right control.
pub async fn instantiate(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = ensure_template_exists(&state.pool, id).await?;
    let slots = empty_slots(&template.schema()?);
    Ok(Json(ActionResponse::ok("Template instantiated", slots)))
}
