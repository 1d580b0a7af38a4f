use axum::Json;
use serde_json::{Value, json};

/// `GET /`: liveness banner.
pub async fn home_route() -> Json<Value> {
    Json(json!({
        "status": "online",
        "message": "TDS Solver API is running. Use POST /api/ to submit questions.",
    }))
}
