//! Photo bookkeeping for proposed-job submissions.
//!
//! [`plan_photos`] is pure: it decides which rows to add and drop, where staged
//! files go and whether the job directory empties out. Applying the plan is up
//! to the caller.

use summerjob_core::photo::{NewPhoto, Photo};
use summerjob_store::{proposed_job_dir, proposed_job_photo_key};

use crate::StagedFile;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoPlan {
    /// Final ordered list, `None` when the submission leaves it as is.
    pub photo_ids: Option<Vec<String>>,
    pub new_photos: Vec<NewPhoto>,
    /// `(staged key, final key)` pairs.
    pub moves: Vec<(String, String)>,
    /// Existing photos to drop; files are removed only after commit.
    pub deleted: Vec<Photo>,
    /// Set when the job ends up with no photos.
    pub remove_dir: Option<String>,
}

impl PhotoPlan {
    pub fn deleted_ids(&self) -> Vec<String> {
        self.deleted.iter().map(|p| p.id.clone()).collect()
    }
}

/// Compute the photo state after a submission.
///
/// `current` is the job's ordered list, `existing` its photo records.
/// Every deletion id leaves the list; only ids with a record of this job
/// get their row and file removed.
pub fn plan_photos(
    job_id: &str,
    current: &[String],
    existing: &[Photo],
    deleted_ids: &[String],
    staged: &[StagedFile],
    mut new_id: impl FnMut() -> String,
) -> PhotoPlan {
    let mut ids = current.to_vec();
    let mut plan = PhotoPlan::default();

    for id in deleted_ids {
        ids.retain(|i| i != id);
        if plan.deleted.iter().any(|p| &p.id == id) {
            continue;
        }
        if let Some(photo) = existing
            .iter()
            .find(|p| &p.id == id && p.proposed_job_id == job_id)
        {
            plan.deleted.push(photo.clone());
        }
    }

    for file in staged {
        let id = new_id();
        let key = proposed_job_photo_key(job_id, &id, &file.extension);
        plan.moves.push((file.key.clone(), key.clone()));
        plan.new_photos.push(NewPhoto {
            id: id.clone(),
            photo_path: key,
            extension: file.extension.clone(),
        });
        ids.push(id);
    }

    if ids.is_empty() {
        plan.remove_dir = Some(proposed_job_dir(job_id));
    }
    if ids != current {
        plan.photo_ids = Some(ids);
    }
    plan
}
