use axum::Json;
use chrono::Local;
use serde_json::{json, Value};

pub const SERVICE_NAME: &str = "Roast My Resume API";

/// GET /health
/// Returns a simple status object with service name, version and local time.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }))
}
