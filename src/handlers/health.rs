use chrono::Utc;
use serde_json::{json, Value};

use crate::middleware::ApiResponse;

/// GET /healthcheck - liveness probe, unauthenticated. Never touches the
/// store, so it answers even while the database is down.
pub async fn healthcheck() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "status": "ok",
        "timestamp": Utc::now(),
    }))
}
