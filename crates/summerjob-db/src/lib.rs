pub mod sqlite;

pub use sqlite::SqliteDatabase;

use std::path::PathBuf;

use async_trait::async_trait;

use summerjob_core::area::{Area, CreateArea};
use summerjob_core::event::{CreateEvent, SummerJobEvent};
use summerjob_core::photo::{NewPhoto, Photo};
use summerjob_core::proposed_job::{CreateProposedJob, ProposedJob, UpdateProposedJob};
use summerjob_core::tool::ToolChanges;
use summerjob_core::worker::{CreateWorker, Worker};

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Internal(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where to open the database.
#[derive(Debug, Clone, Default)]
pub struct DbConfig {
    /// Path to the SQLite file. Defaults to `<data_dir>/summerjob.db`.
    pub sqlite_path: Option<String>,
}

/// `$XDG_DATA_HOME/summerjob`, falling back to `~/.local/share/summerjob`.
pub fn data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local/share")
    } else {
        PathBuf::from(".")
    };
    base.join("summerjob")
}

/// Everything one proposed-job update writes, applied atomically.
#[derive(Debug, Clone, Default)]
pub struct ProposedJobPatch {
    /// Dirty scalar fields.
    pub fields: UpdateProposedJob,
    /// Final ordered photo list, when it changed.
    pub photo_ids: Option<Vec<String>>,
    /// Photo rows to insert. Their files are already in place.
    pub new_photos: Vec<NewPhoto>,
    /// Photo rows to remove.
    pub deleted_photo_ids: Vec<String>,
    pub tools: ToolChanges,
}

impl ProposedJobPatch {
    pub fn is_empty(&self) -> bool {
        self.fields == UpdateProposedJob::default()
            && self.photo_ids.is_none()
            && self.new_photos.is_empty()
            && self.deleted_photo_ids.is_empty()
            && self.tools.is_empty()
    }
}

#[async_trait]
pub trait Database: Send + Sync {
    // -- Proposed jobs --

    /// Insert a job under a caller-chosen id together with its photos and tools.
    async fn create_proposed_job(
        &self,
        id: &str,
        input: &CreateProposedJob,
        photos: &[NewPhoto],
        tools: &ToolChanges,
    ) -> Result<ProposedJob, DbError>;
    async fn get_proposed_job(&self, id: &str) -> Result<ProposedJob, DbError>;
    async fn list_proposed_jobs(&self) -> Result<Vec<ProposedJob>, DbError>;
    /// Apply a patch in a single transaction. Nothing is written on error.
    async fn apply_proposed_job_patch(
        &self,
        id: &str,
        patch: &ProposedJobPatch,
    ) -> Result<ProposedJob, DbError>;
    /// Delete a job; its photo and tool rows go with it.
    async fn delete_proposed_job(&self, id: &str) -> Result<(), DbError>;

    // -- Photos --
    async fn get_photo(&self, id: &str) -> Result<Photo, DbError>;
    async fn list_photos(&self, proposed_job_id: &str) -> Result<Vec<Photo>, DbError>;

    // -- Workers --
    async fn create_worker(&self, input: &CreateWorker) -> Result<Worker, DbError>;
    async fn get_worker(&self, id: &str) -> Result<Worker, DbError>;
    async fn list_workers(&self) -> Result<Vec<Worker>, DbError>;
    async fn set_worker_photo(
        &self,
        id: &str,
        photo_path: Option<&str>,
    ) -> Result<Worker, DbError>;
    async fn delete_worker(&self, id: &str) -> Result<(), DbError>;

    // -- Events --
    async fn create_event(&self, input: &CreateEvent) -> Result<SummerJobEvent, DbError>;
    async fn get_event(&self, id: &str) -> Result<SummerJobEvent, DbError>;
    async fn list_events(&self) -> Result<Vec<SummerJobEvent>, DbError>;
    async fn get_active_event(&self) -> Result<Option<SummerJobEvent>, DbError>;
    /// Make `id` the only active event.
    async fn activate_event(&self, id: &str) -> Result<SummerJobEvent, DbError>;

    // -- Areas --
    async fn create_area(&self, event_id: &str, input: &CreateArea) -> Result<Area, DbError>;
    async fn list_areas(&self, event_id: Option<&str>) -> Result<Vec<Area>, DbError>;
}
