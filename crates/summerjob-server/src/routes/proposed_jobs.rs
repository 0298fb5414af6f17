use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use summerjob_core::proposed_job::{
    ProposedJobCreateInput, ProposedJobUpdateInput, MAX_PHOTOS, PHOTO_FIELD,
};
use summerjob_service::CampService;

use super::{form_error, photo_content_type, to_error, ApiError, AppState};
use crate::form::{decode_form, UploadLimits, MAX_FILE_SIZE};

/// Room for every photo plus the JSON part.
const BODY_LIMIT: usize = MAX_FILE_SIZE * MAX_PHOTOS + 1024 * 1024;

/// Stem of staged file names for a job that does not exist yet.
const NEW_JOB_BASE_NAME: &str = "proposed-job";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/proposed-jobs",
            get(list_proposed_jobs).post(create_proposed_job),
        )
        .route(
            "/api/proposed-jobs/{id}",
            get(get_proposed_job)
                .patch(update_proposed_job)
                .delete(delete_proposed_job),
        )
        .route(
            "/api/proposed-jobs/{id}/photos/{photo_id}",
            get(get_proposed_job_photo),
        )
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
}

async fn list_proposed_jobs(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state
        .service
        .list_proposed_jobs()
        .await
        .map(|jobs| Json(json!(jobs)))
        .map_err(to_error)
}

async fn get_proposed_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .service
        .get_proposed_job(&id)
        .await
        .map(|job| Json(json!(job)))
        .map_err(to_error)
}

async fn create_proposed_job(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let limits = UploadLimits::new(PHOTO_FIELD, NEW_JOB_BASE_NAME, MAX_PHOTOS);
    let form = decode_form(multipart, state.store.as_ref(), &limits)
        .await
        .map_err(form_error)?;

    let input = match ProposedJobCreateInput::parse(&form.json) {
        Ok(input) => input,
        Err(e) => {
            state.service.discard_staging(form.staging).await;
            return Err(to_error(e.into()));
        }
    };
    state
        .service
        .create_proposed_job(input, form.staging)
        .await
        .map(|job| (StatusCode::CREATED, Json(json!(job))))
        .map_err(to_error)
}

async fn update_proposed_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<StatusCode, ApiError> {
    // Unknown jobs are rejected before anything is staged.
    let job = state.service.get_proposed_job(&id).await.map_err(to_error)?;
    let room = MAX_PHOTOS.saturating_sub(job.photo_ids.len());
    let limits = UploadLimits::new(PHOTO_FIELD, id.as_str(), room);
    let form = decode_form(multipart, state.store.as_ref(), &limits)
        .await
        .map_err(form_error)?;

    let input = match ProposedJobUpdateInput::parse(&form.json) {
        Ok(input) => input,
        Err(e) => {
            state.service.discard_staging(form.staging).await;
            return Err(to_error(e.into()));
        }
    };
    state
        .service
        .update_proposed_job(&id, input, form.staging)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(to_error)
}

async fn delete_proposed_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .delete_proposed_job(&id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(to_error)
}

async fn get_proposed_job_photo(
    State(state): State<AppState>,
    Path((id, photo_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (photo, data) = state
        .service
        .get_proposed_job_photo(&id, &photo_id)
        .await
        .map_err(to_error)?;
    let content_type = photo_content_type(&photo.extension);
    Ok(([(header::CONTENT_TYPE, content_type)], data).into_response())
}
