use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{info, warn};

use summerjob_core::area::{Area, CreateArea};
use summerjob_core::event::{CreateEvent, SummerJobEvent};
use summerjob_core::log_event::ApiLogEvent;
use summerjob_core::messages;
use summerjob_core::photo::Photo;
use summerjob_core::proposed_job::{
    ProposedJob, ProposedJobCreateInput, ProposedJobUpdateInput, MAX_PHOTOS, PHOTO_FIELD,
};
use summerjob_core::validate::ValidationErrors;
use summerjob_core::worker::{CreateWorker, Worker, PHOTO_FIELD as WORKER_PHOTO_FIELD};
use summerjob_db::{Database, DbError, ProposedJobPatch};
use summerjob_store::{file_extension, replace_file_stem, FileStore, StoreError};

use crate::reconcile::plan_photos;
use crate::{ActiveEventCache, CampService, ServiceError, Staging};

/// Service backed by a database and a file store in the same process.
pub struct LocalService {
    db: Arc<dyn Database>,
    store: Arc<dyn FileStore>,
    active_event: ActiveEventCache,
}

impl LocalService {
    pub fn new(db: Arc<dyn Database>, store: Arc<dyn FileStore>) -> Self {
        Self {
            db,
            store,
            active_event: ActiveEventCache::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn FileStore> {
        &self.store
    }

    async fn drop_staging(&self, staged: &Staging) {
        if let Some(dir) = &staged.dir {
            if let Err(e) = self.store.delete_dir(dir).await {
                warn!(dir = %dir, error = %e, "failed to remove staging directory");
            }
        }
    }

    /// Best-effort removal; missing files count as removed.
    async fn remove_files(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.store.delete_if_exists(key).await {
                warn!(key = %key, error = %e, "failed to remove file");
            }
        }
    }

    /// Move files into place. On failure the files already moved are removed
    /// again.
    async fn move_files(&self, moves: &[(String, String)]) -> Result<Vec<String>, ServiceError> {
        let mut moved = Vec::with_capacity(moves.len());
        for (from, to) in moves {
            if let Err(e) = self.store.rename(from, to).await {
                self.remove_files(&moved).await;
                return Err(e.into());
            }
            moved.push(to.clone());
        }
        Ok(moved)
    }

    async fn create_proposed_job_staged(
        &self,
        input: ProposedJobCreateInput,
        staged: &Staging,
    ) -> Result<ProposedJob, ServiceError> {
        check_photo_count(staged, MAX_PHOTOS)?;
        let id = uuid::Uuid::new_v4().to_string();
        let plan = plan_photos(&id, &[], &[], &[], &staged.files, new_photo_id);
        let moved = self.move_files(&plan.moves).await?;

        match self
            .db
            .create_proposed_job(&id, &input.job, &plan.new_photos, &input.tools)
            .await
        {
            Ok(job) => {
                audit(ApiLogEvent::JobCreate, &job.id);
                if !input.tools.is_empty() {
                    audit(ApiLogEvent::ToolCreate, &job.id);
                }
                Ok(job)
            }
            Err(e) => {
                self.remove_files(&moved).await;
                Err(e.into())
            }
        }
    }

    async fn update_proposed_job_staged(
        &self,
        id: &str,
        input: ProposedJobUpdateInput,
        staged: &Staging,
    ) -> Result<ProposedJob, ServiceError> {
        let job = self.db.get_proposed_job(id).await?;
        check_photo_count(staged, MAX_PHOTOS.saturating_sub(job.photo_ids.len()))?;

        if input.fields.touches_workers() {
            let mut merged = job.clone();
            input.fields.apply_to(&mut merged);
            merged.worker_errors().into_result(())?;
        }

        let existing = self.db.list_photos(id).await?;
        let plan = plan_photos(
            id,
            &job.photo_ids,
            &existing,
            &input.photo_ids_deleted,
            &staged.files,
            new_photo_id,
        );

        let moved = self.move_files(&plan.moves).await?;
        let patch = ProposedJobPatch {
            fields: input.fields,
            photo_ids: plan.photo_ids.clone(),
            new_photos: plan.new_photos.clone(),
            deleted_photo_ids: plan.deleted_ids(),
            tools: input.tools,
        };
        let updated = match self.db.apply_proposed_job_patch(id, &patch).await {
            Ok(job) => job,
            Err(e) => {
                self.remove_files(&moved).await;
                return Err(e.into());
            }
        };

        // Committed: removed photos can go now.
        let removed: Vec<String> = plan.deleted.iter().map(|p| p.photo_path.clone()).collect();
        self.remove_files(&removed).await;
        if let Some(dir) = &plan.remove_dir {
            if let Err(e) = self.store.delete_dir(dir).await {
                warn!(dir = %dir, error = %e, "failed to remove photo directory");
            }
        }

        audit(ApiLogEvent::JobModify, id);
        if !patch.tools.is_empty() {
            audit(ApiLogEvent::ToolCreate, id);
        }
        Ok(updated)
    }

    async fn create_worker_staged(
        &self,
        input: CreateWorker,
        staged: &Staging,
    ) -> Result<Worker, ServiceError> {
        if staged.files.len() > 1 {
            return Err(ValidationErrors::single(
                WORKER_PHOTO_FIELD,
                format!("{} 1", messages::MAX_COUNT_IMAGE),
            )
            .into());
        }
        let worker = self.db.create_worker(&input).await?;
        audit(ApiLogEvent::WorkerCreate, &worker.id);

        let Some(file) = staged.files.first() else {
            return Ok(worker);
        };
        // The staged name is temporary; the stored photo is named after the worker.
        let target = replace_file_stem(&format!("worker/{}", file.file_name()), &worker.id);
        if let Err(e) = self.store.rename(&file.key, &target).await {
            self.undo_worker(&worker.id).await;
            return Err(e.into());
        }
        match self.db.set_worker_photo(&worker.id, Some(&target)).await {
            Ok(worker) => Ok(worker),
            Err(e) => {
                self.remove_files(&[target]).await;
                self.undo_worker(&worker.id).await;
                Err(e.into())
            }
        }
    }

    async fn undo_worker(&self, id: &str) {
        if let Err(e) = self.db.delete_worker(id).await {
            warn!(worker_id = %id, error = %e, "failed to roll back worker");
        }
    }
}

fn new_photo_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn check_photo_count(staged: &Staging, max: usize) -> Result<(), ServiceError> {
    if staged.files.len() > max {
        return Err(ValidationErrors::single(
            PHOTO_FIELD,
            format!("{} {max}", messages::MAX_COUNT_IMAGE),
        )
        .into());
    }
    Ok(())
}

fn audit(event: ApiLogEvent, resource_id: &str) {
    info!(event = %event, resource_id = %resource_id, "api request");
}

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(msg) => ServiceError::NotFound(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(msg) => ServiceError::NotFound(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

#[async_trait]
impl CampService for LocalService {
    // -- Proposed jobs --

    async fn list_proposed_jobs(&self) -> Result<Vec<ProposedJob>, ServiceError> {
        Ok(self.db.list_proposed_jobs().await?)
    }

    async fn get_proposed_job(&self, id: &str) -> Result<ProposedJob, ServiceError> {
        Ok(self.db.get_proposed_job(id).await?)
    }

    async fn create_proposed_job(
        &self,
        input: ProposedJobCreateInput,
        staged: Staging,
    ) -> Result<ProposedJob, ServiceError> {
        let result = self.create_proposed_job_staged(input, &staged).await;
        self.drop_staging(&staged).await;
        result
    }

    async fn update_proposed_job(
        &self,
        id: &str,
        input: ProposedJobUpdateInput,
        staged: Staging,
    ) -> Result<ProposedJob, ServiceError> {
        let result = self.update_proposed_job_staged(id, input, &staged).await;
        self.drop_staging(&staged).await;
        result
    }

    async fn delete_proposed_job(&self, id: &str) -> Result<(), ServiceError> {
        self.db.delete_proposed_job(id).await?;
        if let Err(e) = self.store.delete_dir(&summerjob_store::proposed_job_dir(id)).await {
            warn!(job_id = %id, error = %e, "failed to remove photo directory");
        }
        audit(ApiLogEvent::JobDelete, id);
        Ok(())
    }

    async fn get_proposed_job_photo(
        &self,
        job_id: &str,
        photo_id: &str,
    ) -> Result<(Photo, Bytes), ServiceError> {
        let photo = self.db.get_photo(photo_id).await?;
        if photo.proposed_job_id != job_id {
            return Err(ServiceError::NotFound(format!("photo {photo_id}")));
        }
        let data = self.store.get(&photo.photo_path).await?;
        Ok((photo, data))
    }

    // -- Workers --

    async fn list_workers(&self) -> Result<Vec<Worker>, ServiceError> {
        Ok(self.db.list_workers().await?)
    }

    async fn get_worker(&self, id: &str) -> Result<Worker, ServiceError> {
        Ok(self.db.get_worker(id).await?)
    }

    async fn create_worker(
        &self,
        input: CreateWorker,
        staged: Staging,
    ) -> Result<Worker, ServiceError> {
        let result = self.create_worker_staged(input, &staged).await;
        self.drop_staging(&staged).await;
        result
    }

    async fn delete_worker(&self, id: &str) -> Result<(), ServiceError> {
        let worker = self.db.get_worker(id).await?;
        self.db.delete_worker(id).await?;
        if let Some(path) = worker.photo_path {
            self.remove_files(&[path]).await;
        }
        audit(ApiLogEvent::WorkerDelete, id);
        Ok(())
    }

    async fn get_worker_photo(&self, id: &str) -> Result<(String, Bytes), ServiceError> {
        let worker = self.db.get_worker(id).await?;
        let path = worker
            .photo_path
            .ok_or_else(|| ServiceError::NotFound(format!("photo of worker {id}")))?;
        let data = self.store.get(&path).await?;
        let extension = file_extension(&path).unwrap_or("unknown").to_string();
        Ok((extension, data))
    }

    // -- Events --

    async fn list_events(&self) -> Result<Vec<SummerJobEvent>, ServiceError> {
        Ok(self.db.list_events().await?)
    }

    async fn create_event(&self, input: &CreateEvent) -> Result<SummerJobEvent, ServiceError> {
        let event = self.db.create_event(input).await?;
        audit(ApiLogEvent::EventCreate, &event.id);
        Ok(event)
    }

    async fn get_active_event(&self) -> Result<Option<SummerJobEvent>, ServiceError> {
        Ok(self.active_event.get(&*self.db).await?)
    }

    async fn activate_event(&self, id: &str) -> Result<SummerJobEvent, ServiceError> {
        match self.db.activate_event(id).await {
            Ok(event) => {
                self.active_event.set(Some(event.clone())).await;
                audit(ApiLogEvent::EventActivate, id);
                Ok(event)
            }
            Err(e) => {
                self.active_event.invalidate().await;
                Err(e.into())
            }
        }
    }

    // -- Areas --

    async fn list_areas(&self, event_id: Option<&str>) -> Result<Vec<Area>, ServiceError> {
        Ok(self.db.list_areas(event_id).await?)
    }

    async fn create_area(&self, input: &CreateArea) -> Result<Area, ServiceError> {
        let event = self
            .active_event
            .get(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::InvalidInput("no active event".into()))?;
        let area = self.db.create_area(&event.id, input).await?;
        audit(ApiLogEvent::AreaCreate, &area.id);
        Ok(area)
    }

    async fn discard_staging(&self, staged: Staging) {
        self.drop_staging(&staged).await;
    }
}
