pub mod areas;
pub mod events;
pub mod health;
pub mod proposed_jobs;
pub mod tools;
pub mod workers;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::{Json, Router};
use serde_json::{json, Value};
use summerjob_service::{LocalService, ServiceError};
use summerjob_store::FileStore;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{error, Level};

use summerjob_core::messages;

use crate::form::FormError;

pub struct InnerAppState {
    pub service: LocalService,
    /// Upload store, used to stage multipart files.
    pub store: Arc<dyn FileStore>,
}

pub type AppState = Arc<InnerAppState>;

pub type ApiError = (StatusCode, Json<Value>);

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(proposed_jobs::routes())
        .merge(workers::routes())
        .merge(events::routes())
        .merge(areas::routes())
        .merge(tools::routes())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Media type for a stored photo, from its file extension.
pub(crate) fn photo_content_type(extension: &str) -> String {
    mime_guess::from_ext(extension)
        .first_or_octet_stream()
        .to_string()
}

pub(crate) fn to_error(e: ServiceError) -> ApiError {
    match e {
        ServiceError::Validation(fields) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "validation failed", "fields": fields })),
        ),
        ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, Json(json!({ "error": e.to_string() }))),
        ServiceError::InvalidInput(_) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
        }
        ServiceError::Internal(_) => {
            error!(error = %e, "request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}

pub(crate) fn form_error(e: FormError) -> ApiError {
    let status = e.status();
    if status.is_server_error() {
        error!(error = %e, "failed to decode form");
    }
    let message = match &e {
        FormError::InvalidJson(_) => messages::INVALID_JSON.to_string(),
        other => other.to_string(),
    };
    let body = match e.field() {
        Some(field) => json!({ "error": message, "fields": { field: [message] } }),
        None => json!({ "error": message }),
    };
    (status, Json(body))
}
