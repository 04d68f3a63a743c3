//! Filesystem-backed [`BlobStore`] served under `/media`.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;

use super::{BlobStore, StoredObject};
use crate::error::AdminError;

/// Route prefix the media directory is served from.
pub const MEDIA_ROUTE: &str = "/media";

/// Stores objects as files under `root/{bucket}/{path}`.
///
/// Public URLs are `{public_base_url}/media/{bucket}/{path}`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: Arc<PathBuf>,
    url_prefix: Arc<str>,
}

impl LocalBlobStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        let prefix = format!("{}{MEDIA_ROUTE}/", public_base_url.trim_end_matches('/'));
        Self {
            root: Arc::new(root.into()),
            url_prefix: Arc::from(prefix),
        }
    }

    /// Directory holding all buckets.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, bucket: &str, path: &str) -> Result<PathBuf, AdminError> {
        if !is_safe_segment(bucket) || !is_safe_relative(path) {
            return Err(AdminError::Storage(format!(
                "refusing object path {bucket}/{path}"
            )));
        }
        Ok(self.root.join(bucket).join(path))
    }
}

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty() && is_safe_relative(segment) && !segment.contains('/')
}

fn is_safe_relative(path: &str) -> bool {
    !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

impl BlobStore for LocalBlobStore {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, AdminError> {
        let file_path = self.file_path(bucket, path)?;
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AdminError::Storage(e.to_string()))?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file_path)
            .await
            .map_err(|e| AdminError::Storage(format!("{bucket}/{path}: {e}")))?;
        file.write_all(bytes)
            .await
            .map_err(|e| AdminError::Storage(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| AdminError::Storage(e.to_string()))?;
        tracing::info!(bucket, path, content_type, size = bytes.len(), "object stored");
        Ok(format!("{}{bucket}/{path}", self.url_prefix))
    }

    async fn delete(&self, bucket: &str, path: &str) -> Result<(), AdminError> {
        let file_path = self.file_path(bucket, path)?;
        match tokio::fs::remove_file(&file_path).await {
            Ok(()) => {
                tracing::info!(bucket, path, "object deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(bucket, path, "object already gone");
                Ok(())
            }
            Err(e) => Err(AdminError::Storage(format!("{bucket}/{path}: {e}"))),
        }
    }

    fn locate(&self, url: &str) -> Option<StoredObject> {
        let rest = url.strip_prefix(&*self.url_prefix)?;
        let (bucket, path) = rest.split_once('/')?;
        (is_safe_segment(bucket) && is_safe_relative(path)).then(|| StoredObject {
            bucket: bucket.to_string(),
            path: path.to_string(),
        })
    }
}
