use axum::Json;
use serde_json::{Value, json};

/// Liveness probe: succeeds whenever the process is up, independent of any
/// prior extraction failures.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
