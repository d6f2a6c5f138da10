use serde_json::json;

use crate::api::response::ApiResponse;
use crate::config;

/// `GET /api/health` — liveness probe.
pub async fn check() -> ApiResponse<serde_json::Value> {
    ApiResponse::ok(
        "Service healthy",
        json!({ "status": "ok", "version": config::APP_VERSION }),
    )
}
