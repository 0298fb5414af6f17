use serde::{Deserialize, Serialize};

/// A stored image belonging to a proposed job.
///
/// `photo_path` is a key relative to the upload root, e.g.
/// `proposed-job/<job id>/<photo id>.png`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    pub photo_path: String,
    pub extension: String,
    pub proposed_job_id: String,
}

/// A photo about to be registered: id and key are fixed before the
/// database row exists so the file can be moved into place first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPhoto {
    pub id: String,
    pub photo_path: String,
    pub extension: String,
}
