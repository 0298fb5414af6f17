use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use summerjob_core::area::CreateArea;
use summerjob_service::CampService;

use super::{to_error, ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/areas", get(list_areas).post(create_area))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AreaQuery {
    event_id: Option<String>,
}

async fn list_areas(
    State(state): State<AppState>,
    Query(q): Query<AreaQuery>,
) -> Result<Json<Value>, ApiError> {
    state
        .service
        .list_areas(q.event_id.as_deref())
        .await
        .map(|a| Json(json!(a)))
        .map_err(to_error)
}

async fn create_area(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input = CreateArea::parse(&body).map_err(|e| to_error(e.into()))?;
    state
        .service
        .create_area(&input)
        .await
        .map(|a| (StatusCode::CREATED, Json(json!(a))))
        .map_err(to_error)
}
