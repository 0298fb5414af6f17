use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use summerjob_core::event::CreateEvent;
use summerjob_service::{CampService, ServiceError};

use super::{to_error, ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/summerjob-events", get(list_events).post(create_event))
        .route("/api/summerjob-events/active", get(get_active_event))
        .route("/api/summerjob-events/{id}/activate", post(activate_event))
}

async fn list_events(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state
        .service
        .list_events()
        .await
        .map(|e| Json(json!(e)))
        .map_err(to_error)
}

async fn create_event(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input = CreateEvent::parse(&body).map_err(|e| to_error(e.into()))?;
    state
        .service
        .create_event(&input)
        .await
        .map(|e| (StatusCode::CREATED, Json(json!(e))))
        .map_err(to_error)
}

async fn get_active_event(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    match state.service.get_active_event().await.map_err(to_error)? {
        Some(event) => Ok(Json(json!(event))),
        None => Err(to_error(ServiceError::NotFound("active event".into()))),
    }
}

async fn activate_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .service
        .activate_event(&id)
        .await
        .map(|e| Json(json!(e)))
        .map_err(to_error)
}
