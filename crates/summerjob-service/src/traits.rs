use async_trait::async_trait;
use bytes::Bytes;
use summerjob_core::area::{Area, CreateArea};
use summerjob_core::event::{CreateEvent, SummerJobEvent};
use summerjob_core::photo::Photo;
use summerjob_core::proposed_job::{ProposedJob, ProposedJobCreateInput, ProposedJobUpdateInput};
use summerjob_core::validate::ValidationErrors;
use summerjob_core::worker::{CreateWorker, Worker};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for ServiceError {
    fn from(e: ValidationErrors) -> Self {
        ServiceError::Validation(e)
    }
}

/// An uploaded file sitting in a staging directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Store key, e.g. `.staging/<id>/photo-0.png`.
    pub key: String,
    /// Extension derived from the declared media type.
    pub extension: String,
}

impl StagedFile {
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

/// The files of one request and the scratch directory holding them.
/// Whoever consumes a `Staging` removes its directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Staging {
    pub dir: Option<String>,
    pub files: Vec<StagedFile>,
}

impl Staging {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Camp operations behind the HTTP API.
#[async_trait]
pub trait CampService: Send + Sync {
    // -- Proposed jobs --
    async fn list_proposed_jobs(&self) -> Result<Vec<ProposedJob>, ServiceError>;
    async fn get_proposed_job(&self, id: &str) -> Result<ProposedJob, ServiceError>;
    async fn create_proposed_job(
        &self,
        input: ProposedJobCreateInput,
        staged: Staging,
    ) -> Result<ProposedJob, ServiceError>;
    /// Apply a partial update, reconciling photos and tools.
    async fn update_proposed_job(
        &self,
        id: &str,
        input: ProposedJobUpdateInput,
        staged: Staging,
    ) -> Result<ProposedJob, ServiceError>;
    async fn delete_proposed_job(&self, id: &str) -> Result<(), ServiceError>;
    async fn get_proposed_job_photo(
        &self,
        job_id: &str,
        photo_id: &str,
    ) -> Result<(Photo, Bytes), ServiceError>;

    // -- Workers --
    async fn list_workers(&self) -> Result<Vec<Worker>, ServiceError>;
    async fn get_worker(&self, id: &str) -> Result<Worker, ServiceError>;
    async fn create_worker(
        &self,
        input: CreateWorker,
        staged: Staging,
    ) -> Result<Worker, ServiceError>;
    async fn delete_worker(&self, id: &str) -> Result<(), ServiceError>;
    /// Photo bytes and their file extension.
    async fn get_worker_photo(&self, id: &str) -> Result<(String, Bytes), ServiceError>;

    // -- Events --
    async fn list_events(&self) -> Result<Vec<SummerJobEvent>, ServiceError>;
    async fn create_event(&self, input: &CreateEvent) -> Result<SummerJobEvent, ServiceError>;
    async fn get_active_event(&self) -> Result<Option<SummerJobEvent>, ServiceError>;
    async fn activate_event(&self, id: &str) -> Result<SummerJobEvent, ServiceError>;

    // -- Areas --
    async fn list_areas(&self, event_id: Option<&str>) -> Result<Vec<Area>, ServiceError>;
    /// Create an area in the active event.
    async fn create_area(&self, input: &CreateArea) -> Result<Area, ServiceError>;

    /// Remove a staging directory that will not be consumed.
    async fn discard_staging(&self, staged: Staging);
}
