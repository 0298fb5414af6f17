use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::{FileStore, StoreConfig, StoreError};

/// Filesystem-backed store rooted at the upload directory.
pub struct LocalStore {
    base_dir: PathBuf,
}

impl LocalStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            base_dir: config.upload_root(),
        }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StoreError> {
        let rel = Path::new(key);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StoreError::Internal(format!("invalid key: {key}")));
        }
        Ok(self.base_dir.join(rel))
    }
}

fn io_err(op: &str, path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Internal(format!("{op} {}: {e}", path.display()))
}

async fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| io_err("mkdir", parent, e))?;
    }
    Ok(())
}

#[async_trait]
impl FileStore for LocalStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<(), StoreError> {
        let path = self.resolve(key)?;
        ensure_parent(&path).await?;
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| io_err("write", &path, e))
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(key.to_string())),
            Err(e) => Err(io_err("read", &path, e)),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(key.to_string())),
            Err(e) => Err(io_err("delete", &path, e)),
        }
    }

    async fn delete_dir(&self, key: &str) -> Result<(), StoreError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => {
                debug!(key = %key, "removed directory");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err("rmdir", &path, e)),
        }
    }

    async fn create_dir(&self, key: &str) -> Result<(), StoreError> {
        let path = self.resolve(key)?;
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| io_err("mkdir", &path, e))
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), StoreError> {
        let src = self.resolve(from)?;
        let dst = self.resolve(to)?;
        ensure_parent(&dst).await?;
        match tokio::fs::rename(&src, &dst).await {
            Ok(()) => {
                debug!(from = %from, to = %to, "moved file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(from.to_string())),
            Err(e) => Err(io_err("rename", &src, e)),
        }
    }
}
