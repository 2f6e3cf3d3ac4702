// handlers/health.rs - GET /health
use axum::Json;
use serde_json::{json, Value};

/// Static liveness payload. Storage is not consulted.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Coffee Recipe Hub API is running"
    }))
}
