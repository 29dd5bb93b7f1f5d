//! Media storage for generated images.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::errors::CoreError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        CoreError::internal(err.to_string())
    }
}

#[async_trait]
pub trait MediaStorage: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Remove every object under `prefix`; returns how many were removed.
    async fn delete_prefix(&self, prefix: &str) -> Result<usize, StorageError>;

    fn public_url(&self, key: &str) -> String;
}

/// Storage key for a content item's image.
pub fn draft_image_key(content_item_id: i32, variant: &str, timestamp_ms: i64, format: &str) -> String {
    format!(
        "{}{}-{}.{}",
        draft_image_prefix(content_item_id),
        variant,
        timestamp_ms,
        format
    )
}

/// Directory-style prefix shared by every image of one content item.
pub fn draft_image_prefix(content_item_id: i32) -> String {
    format!("draft-images/{}/", content_item_id)
}

fn validate_key(key: &str) -> Result<&Path, StorageError> {
    let path = Path::new(key);
    let safe = !key.is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if safe {
        Ok(path)
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// Filesystem storage served back under `{public_url}/media`.
#[derive(Clone, Debug)]
pub struct LocalMediaStorage {
    root: PathBuf,
    public_url: String,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let target = self.root.join(validate_key(key)?);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        debug!("Stored {} bytes at {}", bytes.len(), target.display());
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, StorageError> {
        let dir = self.root.join(validate_key(prefix)?);
        if !tokio::fs::try_exists(&dir).await? {
            return Ok(0);
        }
        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                tokio::fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/media/{}", self.public_url, key)
    }
}
