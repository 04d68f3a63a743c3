//! Blob store double that records every call.

use std::sync::{Arc, Mutex, PoisonError};

use super::{BlobStore, StoredObject};
use crate::error::AdminError;

pub(crate) const TEST_PREFIX: &str = "https://media.test/media/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BlobCall {
    Upload { bucket: String, path: String },
    Delete { bucket: String, path: String },
}

#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingBlobStore {
    calls: Arc<Mutex<Vec<BlobCall>>>,
    fail_uploads: bool,
    fail_deletes: bool,
}

impl RecordingBlobStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_uploads() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    pub(crate) fn failing_deletes() -> Self {
        Self {
            fail_deletes: true,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<BlobCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BlobCall::Delete { path, .. } => Some(path),
                BlobCall::Upload { .. } => None,
            })
            .collect()
    }

    pub(crate) fn uploads(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, BlobCall::Upload { .. }))
            .count()
    }

    fn record(&self, call: BlobCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl BlobStore for RecordingBlobStore {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        _bytes: &[u8],
        _content_type: &str,
    ) -> Result<String, AdminError> {
        self.record(BlobCall::Upload {
            bucket: bucket.to_string(),
            path: path.to_string(),
        });
        if self.fail_uploads {
            return Err(AdminError::Storage("injected upload failure".to_string()));
        }
        Ok(format!("{TEST_PREFIX}{bucket}/{path}"))
    }

    async fn delete(&self, bucket: &str, path: &str) -> Result<(), AdminError> {
        self.record(BlobCall::Delete {
            bucket: bucket.to_string(),
            path: path.to_string(),
        });
        if self.fail_deletes {
            return Err(AdminError::Storage("injected delete failure".to_string()));
        }
        Ok(())
    }

    fn locate(&self, url: &str) -> Option<StoredObject> {
        let (bucket, path) = url.strip_prefix(TEST_PREFIX)?.split_once('/')?;
        Some(StoredObject {
            bucket: bucket.to_string(),
            path: path.to_string(),
        })
    }
}
