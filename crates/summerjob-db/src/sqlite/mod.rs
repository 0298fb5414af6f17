pub(crate) mod migrations;
pub mod queries;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;

use summerjob_core::area::{Area, CreateArea};
use summerjob_core::event::{CreateEvent, SummerJobEvent};
use summerjob_core::photo::{NewPhoto, Photo};
use summerjob_core::proposed_job::{CreateProposedJob, ProposedJob};
use summerjob_core::tool::ToolChanges;
use summerjob_core::worker::{CreateWorker, Worker};

use crate::{Database, DbConfig, DbError, ProposedJobPatch};

/// Extension trait that converts `rusqlite::Result<T>` into `Result<T, DbError>`.
pub(crate) trait SqliteResultExt<T> {
    fn to_db(self) -> Result<T, DbError>;
}

impl<T> SqliteResultExt<T> for rusqlite::Result<T> {
    fn to_db(self) -> Result<T, DbError> {
        self.map_err(map_sqlite_err)
    }
}

/// Like `to_db`, but an empty result becomes `DbError::NotFound(what)`.
pub(crate) fn or_not_found<T>(result: rusqlite::Result<T>, what: String) -> Result<T, DbError> {
    result.map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(what),
        other => DbError::Internal(other.to_string()),
    })
}

/// Read a JSON-encoded text column.
pub(crate) fn json_column<T: DeserializeOwned>(row: &Row, name: &str) -> rusqlite::Result<T> {
    let raw: String = row.get(name)?;
    serde_json::from_str(&raw).map_err(|e| {
        let idx = row.as_ref().column_index(name).unwrap_or(0);
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
    })
}

pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, DbError> {
    serde_json::to_string(value).map_err(|e| DbError::Internal(format!("encode json: {e}")))
}

#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    pub fn open(config: &DbConfig) -> Result<Self, DbError> {
        let path = config
            .sqlite_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| crate::data_dir().join("summerjob.db"));
        std::fs::create_dir_all(path.parent().unwrap_or(Path::new(".")))?;
        Self::open_path(&path)
    }

    pub fn open_path(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path).to_db()?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )
        .to_db()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory().to_db()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;").to_db()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub(crate) fn with_conn<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| DbError::Internal("lock poisoned".into()))?;
        f(&conn)
    }

    /// Run `f` inside a transaction that commits only if `f` succeeds.
    pub(crate) fn with_tx<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction().to_db()?;
            let value = f(&tx)?;
            tx.commit().to_db()?;
            Ok(value)
        })
    }

    fn run_migrations(&self) -> Result<(), DbError> {
        self.with_conn(migrations::run)
    }
}

/// Map a `rusqlite::Error` into a `DbError::Internal`.
pub(crate) fn map_sqlite_err(e: rusqlite::Error) -> DbError {
    DbError::Internal(e.to_string())
}


#[async_trait]
impl Database for SqliteDatabase {
    // -- Proposed jobs --
    async fn create_proposed_job(
        &self,
        id: &str,
        input: &CreateProposedJob,
        photos: &[NewPhoto],
        tools: &ToolChanges,
    ) -> Result<ProposedJob, DbError> {
        let db = self.clone();
        let id = id.to_string();
        let input = input.clone();
        let photos = photos.to_vec();
        let tools = tools.clone();
        tokio::task::spawn_blocking(move || {
            db.create_proposed_job_sync(&id, &input, &photos, &tools)
        })
        .await
        .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn get_proposed_job(&self, id: &str) -> Result<ProposedJob, DbError> {
        let db = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || db.get_proposed_job_sync(&id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn list_proposed_jobs(&self) -> Result<Vec<ProposedJob>, DbError> {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.list_proposed_jobs_sync())
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn apply_proposed_job_patch(
        &self,
        id: &str,
        patch: &ProposedJobPatch,
    ) -> Result<ProposedJob, DbError> {
        let db = self.clone();
        let id = id.to_string();
        let patch = patch.clone();
        tokio::task::spawn_blocking(move || db.apply_proposed_job_patch_sync(&id, &patch))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn delete_proposed_job(&self, id: &str) -> Result<(), DbError> {
        let db = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || db.delete_proposed_job_sync(&id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }

    // -- Photos --
    async fn get_photo(&self, id: &str) -> Result<Photo, DbError> {
        let db = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || db.get_photo_sync(&id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn list_photos(&self, proposed_job_id: &str) -> Result<Vec<Photo>, DbError> {
        let db = self.clone();
        let proposed_job_id = proposed_job_id.to_string();
        tokio::task::spawn_blocking(move || db.list_photos_sync(&proposed_job_id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }

    // -- Workers --
    async fn create_worker(&self, input: &CreateWorker) -> Result<Worker, DbError> {
        let db = self.clone();
        let input = input.clone();
        tokio::task::spawn_blocking(move || db.create_worker_sync(&input))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn get_worker(&self, id: &str) -> Result<Worker, DbError> {
        let db = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || db.get_worker_sync(&id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn list_workers(&self) -> Result<Vec<Worker>, DbError> {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.list_workers_sync())
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn set_worker_photo(
        &self,
        id: &str,
        photo_path: Option<&str>,
    ) -> Result<Worker, DbError> {
        let db = self.clone();
        let id = id.to_string();
        let photo_path = photo_path.map(str::to_string);
        tokio::task::spawn_blocking(move || db.set_worker_photo_sync(&id, photo_path.as_deref()))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn delete_worker(&self, id: &str) -> Result<(), DbError> {
        let db = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || db.delete_worker_sync(&id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }

    // -- Events --
    async fn create_event(&self, input: &CreateEvent) -> Result<SummerJobEvent, DbError> {
        let db = self.clone();
        let input = input.clone();
        tokio::task::spawn_blocking(move || db.create_event_sync(&input))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn get_event(&self, id: &str) -> Result<SummerJobEvent, DbError> {
        let db = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || db.get_event_sync(&id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn list_events(&self) -> Result<Vec<SummerJobEvent>, DbError> {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.list_events_sync())
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn get_active_event(&self) -> Result<Option<SummerJobEvent>, DbError> {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.get_active_event_sync())
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn activate_event(&self, id: &str) -> Result<SummerJobEvent, DbError> {
        let db = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || db.activate_event_sync(&id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }

    // -- Areas --
    async fn create_area(&self, event_id: &str, input: &CreateArea) -> Result<Area, DbError> {
        let db = self.clone();
        let event_id = event_id.to_string();
        let input = input.clone();
        tokio::task::spawn_blocking(move || db.create_area_sync(&event_id, &input))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn list_areas(&self, event_id: Option<&str>) -> Result<Vec<Area>, DbError> {
        let db = self.clone();
        let event_id = event_id.map(str::to_string);
        tokio::task::spawn_blocking(move || db.list_areas_sync(event_id.as_deref()))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
}
