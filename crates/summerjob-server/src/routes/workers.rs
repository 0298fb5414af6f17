use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use summerjob_core::worker::{CreateWorker, PHOTO_FIELD};
use summerjob_service::CampService;
use summerjob_store::generate_file_name;

use super::{form_error, photo_content_type, to_error, ApiError, AppState};
use crate::form::{decode_form, UploadLimits, MAX_FILE_SIZE};

/// Length of the temporary name a worker photo is staged under.
const TEMP_NAME_LEN: usize = 30;

const PHOTO_CACHE_CONTROL: &str = "public, max-age=5, must-revalidate";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/workers", get(list_workers))
        .route(
            "/api/workers/new",
            post(create_worker).layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024)),
        )
        .route("/api/workers/{id}", get(get_worker).delete(delete_worker))
        .route("/api/workers/{id}/photo", get(get_worker_photo))
}

async fn list_workers(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state
        .service
        .list_workers()
        .await
        .map(|w| Json(json!(w)))
        .map_err(to_error)
}

async fn get_worker(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .service
        .get_worker(&id)
        .await
        .map(|w| Json(json!(w)))
        .map_err(to_error)
}

async fn create_worker(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let limits = UploadLimits::new(PHOTO_FIELD, generate_file_name(TEMP_NAME_LEN), 1);
    let form = decode_form(multipart, state.store.as_ref(), &limits)
        .await
        .map_err(form_error)?;

    let input = match CreateWorker::parse(&form.json) {
        Ok(input) => input,
        Err(e) => {
            state.service.discard_staging(form.staging).await;
            return Err(to_error(e.into()));
        }
    };
    state
        .service
        .create_worker(input, form.staging)
        .await
        .map(|w| (StatusCode::CREATED, Json(json!(w))))
        .map_err(to_error)
}

async fn delete_worker(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .delete_worker(&id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(to_error)
}

async fn get_worker_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let (extension, data) = state
        .service
        .get_worker_photo(&id)
        .await
        .map_err(to_error)?;
    let headers = [
        (header::CONTENT_TYPE, photo_content_type(&extension)),
        (header::CACHE_CONTROL, PHOTO_CACHE_CONTROL.to_string()),
    ];
    Ok((headers, data).into_response())
}
