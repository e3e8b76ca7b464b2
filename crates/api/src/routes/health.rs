//! Root-level `/health`: database reachability and schema state.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use catalog_db::SchemaStatus;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable or behind.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Absent when the database could not be queried.
    pub schema: Option<SchemaStatus>,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let schema = match catalog_db::schema_status(&state.pool).await {
        Ok(schema) => Some(schema),
        Err(err) => {
            tracing::warn!(error = %err, "Health check could not read schema status");
            None
        }
    };
    let db_healthy = schema.is_some();

    let status = match &schema {
        Some(schema) if schema.is_current() => "ok",
        Some(schema) => {
            tracing::warn!(pending = ?schema.pending, "Database schema is behind this build");
            "degraded"
        }
        None => "degraded",
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        schema,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
