use axum::Json;
use serde_json::{json, Value};

/// Axum handler for `GET /api/v1/health`.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
