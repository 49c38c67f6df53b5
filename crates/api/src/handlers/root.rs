use axum::Json;
use serde_json::{json, Value};

/// GET /api/
pub async fn index() -> Json<Value> {
    Json(json!({ "message": "DJ Persona Generator API" }))
}
