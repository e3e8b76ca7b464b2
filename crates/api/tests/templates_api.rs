//! HTTP-level integration tests for the `/templates` resource.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, delete, get, post_json, put_json};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_boiler_spec(pool: &PgPool) -> serde_json::Value {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/templates",
        json!({
            "name": "Boiler Spec",
            "fields": [
                { "name": "BTU", "field_type": "TEXT" },
                { "name": "Fuel", "field_type": "SELECT", "options": "Gas, Electric" }
            ]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

async fn template_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM templates")
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Test: create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_template(pool: PgPool) {
    let data = create_boiler_spec(&pool).await;

    assert_eq!(data["name"], "Boiler Spec");
    assert_eq!(data["status_id"], 1);
    let fields = data["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0]["field_type"], "text");
    assert!(fields[0]["options"].is_null());
    assert_eq!(fields[1]["options"], json!(["Gas", "Electric"]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_with_no_fields_is_rejected(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/templates",
        json!({ "name": "Empty", "fields": [] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["field"], "fields");
    assert_eq!(template_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_with_nameless_field_is_rejected(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/templates",
        json!({ "name": "T", "fields": [{ "name": "   ", "field_type": "text" }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "fields[0].name");
    assert_eq!(template_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_with_blank_name_is_rejected(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/templates",
        json!({ "name": "   ", "fields": [{ "name": "BTU", "field_type": "text" }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["field"], "name");
    assert_eq!(template_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_select_without_options_is_rejected(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/templates",
        json!({ "name": "T", "fields": [{ "name": "Fuel", "field_type": "select", "options": " , " }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "Fuel");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_malformed_body_uses_envelope(pool: PgPool) {
    let response = post_json(
        build_test_app(pool),
        "/api/v1/templates",
        json!({ "name": "T", "fields": [{ "name": "A", "field_type": "checkbox" }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_status_is_rejected(pool: PgPool) {
    let response = post_json(
        build_test_app(pool),
        "/api/v1/templates",
        json!({ "name": "T", "status_id": 9, "fields": [{ "name": "A", "field_type": "text" }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "status_id");
}

// ---------------------------------------------------------------------------
// Test: read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_list_and_instantiate(pool: PgPool) {
    let data = create_boiler_spec(&pool).await;
    let id = data["id"].as_i64().unwrap();

    let response = get(build_test_app(pool.clone()), &format!("/api/v1/templates/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["fields"].as_array().unwrap().len(), 2);

    let response = get(build_test_app(pool.clone()), "/api/v1/templates?status_id=1").await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
    let response = get(build_test_app(pool.clone()), "/api/v1/templates?status_id=2").await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());

    let response = get(
        build_test_app(pool.clone()),
        &format!("/api/v1/templates/{id}/instance"),
    )
    .await;
    let slots = body_json(response).await["data"].clone();
    assert_eq!(slots[0]["name"], "BTU");
    assert_eq!(slots[0]["field_type"], "text");
    assert_eq!(slots[0]["value"], "");
    assert_eq!(slots[1]["field_type"], "select");
    assert_eq!(slots[1]["options"], json!(["Gas", "Electric"]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_missing_template_is_404(pool: PgPool) {
    let response = get(build_test_app(pool), "/api/v1/templates/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Test: update (reconciliation)
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_reconciles_fields(pool: PgPool) {
    let data = create_boiler_spec(&pool).await;
    let id = data["id"].as_i64().unwrap();
    let fuel_id = data["fields"][1]["id"].as_i64().unwrap();

    let response = put_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/templates/{id}"),
        json!({
            "name": "Boiler Spec",
            "status_id": 2,
            "fields": [
                { "id": fuel_id, "name": "Fuel", "field_type": "select", "options": ["Gas", "Electric"] },
                { "name": "Color", "field_type": "text" }
            ]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Template updated");
    assert_eq!(json["data"]["status_id"], 2);
    assert_eq!(json["data"]["version"], 2);
    let fields = json["data"]["fields"].as_array().unwrap();
    let names: Vec<_> = fields.iter().map(|f| f["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Fuel", "Color"]);
    assert_eq!(fields[0]["id"], fuel_id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_with_stale_field_id_is_404(pool: PgPool) {
    let data = create_boiler_spec(&pool).await;
    let id = data["id"].as_i64().unwrap();

    let response = put_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/templates/{id}"),
        json!({
            "name": "Boiler Spec",
            "fields": [{ "id": 999999, "name": "Ghost", "field_type": "text" }]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "TemplateField with id 999999 not found");

    // Nothing changed.
    let response = get(build_test_app(pool), &format!("/api/v1/templates/{id}")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["version"], 1);
    assert_eq!(json["data"]["fields"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_with_blank_name_keeps_stored_name(pool: PgPool) {
    let data = create_boiler_spec(&pool).await;
    let id = data["id"].as_i64().unwrap();

    let response = put_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/templates/{id}"),
        json!({ "name": "\t ", "fields": [{ "name": "BTU", "field_type": "text" }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "name");

    let response = get(build_test_app(pool), &format!("/api/v1/templates/{id}")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Boiler Spec");
    assert_eq!(json["data"]["version"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_to_no_fields_is_rejected(pool: PgPool) {
    let data = create_boiler_spec(&pool).await;
    let id = data["id"].as_i64().unwrap();

    let response = put_json(
        build_test_app(pool),
        &format!("/api/v1/templates/{id}"),
        json!({ "name": "Boiler Spec", "fields": [] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_template(pool: PgPool) {
    let data = create_boiler_spec(&pool).await;
    let id = data["id"].as_i64().unwrap();

    let response = delete(build_test_app(pool.clone()), &format!("/api/v1/templates/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert!(json.get("data").is_none());

    let response = delete(build_test_app(pool), &format!("/api/v1/templates/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
