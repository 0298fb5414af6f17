mod local;

pub use local::LocalStore;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use rand::RngCore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Internal(String),
}

/// File storage for uploaded images, keyed by `/`-separated paths relative
/// to the upload root.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Write (create or overwrite) a file, creating parent directories.
    async fn put(&self, key: &str, data: Bytes) -> Result<(), StoreError>;

    /// Read a file. Returns `StoreError::NotFound` if absent.
    async fn get(&self, key: &str) -> Result<Bytes, StoreError>;

    /// Delete a single file. Returns `StoreError::NotFound` if absent.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Delete a single file, treating an absent file as already deleted.
    async fn delete_if_exists(&self, key: &str) -> Result<(), StoreError> {
        match self.delete(key).await {
            Ok(()) | Err(StoreError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Remove a directory and everything below it. No-op if absent.
    async fn delete_dir(&self, key: &str) -> Result<(), StoreError>;

    /// Create a directory and its parents. No-op if it already exists.
    async fn create_dir(&self, key: &str) -> Result<(), StoreError>;

    /// Move a file, creating the destination's parent directories.
    async fn rename(&self, from: &str, to: &str) -> Result<(), StoreError>;
}

// -- Key helpers --

/// Directory holding per-request scratch directories.
pub const STAGING_DIR: &str = ".staging";

pub fn staging_key(staging_id: &str) -> String {
    format!("{STAGING_DIR}/{staging_id}")
}

pub fn proposed_job_dir(job_id: &str) -> String {
    format!("proposed-job/{job_id}")
}

pub fn proposed_job_photo_key(job_id: &str, photo_id: &str, extension: &str) -> String {
    format!("proposed-job/{job_id}/{photo_id}.{extension}")
}

pub fn worker_photo_key(worker_id: &str, extension: &str) -> String {
    format!("worker/{worker_id}.{extension}")
}

/// Random lowercase hex string of `len` characters.
pub fn generate_file_name(len: usize) -> String {
    let mut bytes = vec![0u8; len.div_ceil(2)];
    rand::thread_rng().fill_bytes(&mut bytes);
    let mut name = hex::encode(bytes);
    name.truncate(len);
    name
}

/// Sibling key with the file stem replaced and the extension kept:
/// `worker/tmp.png` + `w1` → `worker/w1.png`.
pub fn replace_file_stem(key: &str, new_stem: &str) -> String {
    let (dir, file) = match key.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, key),
    };
    let renamed = match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{new_stem}.{ext}"),
        _ => new_stem.to_string(),
    };
    match dir {
        Some(dir) => format!("{dir}/{renamed}"),
        None => renamed,
    }
}

/// Extension of the key's file name, if any.
pub fn file_extension(key: &str) -> Option<&str> {
    let file = key.rsplit('/').next().unwrap_or(key);
    match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

// -- Configuration --

/// Default upload directory, relative to the parent of the working directory.
pub const DEFAULT_UPLOAD_DIR: &str = "web-storage";

/// Configuration for the upload store.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// `UPLOAD_DIR` override, appended to the parent of the working directory.
    pub upload_dir: Option<String>,
    /// Absolute upload root. Takes precedence over `upload_dir`.
    pub root: Option<PathBuf>,
}

impl StoreConfig {
    /// Build from the `UPLOAD_DIR` environment variable.
    pub fn from_env() -> Self {
        Self {
            upload_dir: std::env::var("UPLOAD_DIR").ok().filter(|s| !s.is_empty()),
            root: None,
        }
    }

    /// Resolve the directory all keys are relative to.
    pub fn upload_root(&self) -> PathBuf {
        if let Some(root) = &self.root {
            return root.clone();
        }
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        upload_root_from(&cwd, self.upload_dir.as_deref())
    }
}

fn upload_root_from(cwd: &Path, upload_dir: Option<&str>) -> PathBuf {
    let parent = cwd.parent().unwrap_or(cwd);
    let dir = upload_dir
        .map(|d| d.trim_start_matches('/'))
        .filter(|d| !d.is_empty())
        .unwrap_or(DEFAULT_UPLOAD_DIR);
    parent.join(dir)
}

// -- Factory --

pub fn create_store(config: &StoreConfig) -> Arc<dyn FileStore> {
    Arc::new(LocalStore::new(config))
}
