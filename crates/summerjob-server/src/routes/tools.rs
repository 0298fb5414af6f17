use axum::{extract::Path, routing::get, Json, Router};
use serde_json::{json, Value};
use summerjob_core::tool::job_types_for_tool;

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/tools/job-types/{tool}", get(job_types))
}

/// Job types a tool is used for; unknown tools map to `OTHER`.
async fn job_types(Path(tool): Path<String>) -> Json<Value> {
    Json(json!({ "tool": tool, "jobTypes": job_types_for_tool(&tool) }))
}
