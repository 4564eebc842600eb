use axum::Json;
use serde_json::{Value, json};

pub async fn index() -> Json<Value> {
    Json(json!({
        "service": "pdfduck API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/extract", "/extract/batch", "/health"],
    }))
}
