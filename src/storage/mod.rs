//! Blob storage for event images.
//!
//! [`BlobStore`] uploads objects into named buckets and hands back their
//! public URL. [`BlobStore::locate`] maps a URL back to a stored object, and
//! returns `None` for anything the store did not produce, so externally
//! linked images are never deleted.

pub mod local;

#[cfg(test)]
pub(crate) mod recording;

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::error::AdminError;

pub use local::LocalBlobStore;

/// Bucket holding event images.
pub const EVENTS_BUCKET: &str = "events";

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Bucket name.
    pub bucket: String,
    /// Path inside the bucket.
    pub path: String,
}

/// Object storage operations.
pub trait BlobStore: Clone + Send + Sync + 'static {
    /// Stores `bytes` at `bucket/path` and returns the public URL.
    ///
    /// Never overwrites an existing object.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Storage`] if the object cannot be written.
    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> impl Future<Output = Result<String, AdminError>> + Send;

    /// Removes `bucket/path`; a missing object is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Storage`] if the object cannot be removed.
    fn delete(&self, bucket: &str, path: &str)
    -> impl Future<Output = Result<(), AdminError>> + Send;

    /// Maps a public URL back to the stored object, if it is one of ours.
    fn locate(&self, url: &str) -> Option<StoredObject>;
}

/// An image file received from a form.
#[derive(Clone)]
pub struct ImageUpload {
    /// Client-side file name.
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    /// Checks the MIME type and size.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidImage`] for non-image or empty files and
    /// [`AdminError::ImageTooLarge`] above `max_bytes`.
    pub fn validate(&self, max_bytes: usize) -> Result<(), AdminError> {
        if !self.content_type.starts_with("image/") {
            return Err(AdminError::InvalidImage(
                "Please select a valid image file".to_string(),
            ));
        }
        if self.bytes.is_empty() {
            return Err(AdminError::InvalidImage("Image file is empty".to_string()));
        }
        if self.bytes.len() > max_bytes {
            return Err(AdminError::ImageTooLarge {
                size: self.bytes.len(),
                max: max_bytes,
            });
        }
        Ok(())
    }

    /// File extension taken from the file name, or from the MIME subtype.
    #[must_use]
    pub fn extension(&self) -> String {
        let from_name = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| sanitize_extension(ext))
            .filter(|ext| !ext.is_empty());
        from_name.unwrap_or_else(|| {
            let subtype = self
                .content_type
                .split_once('/')
                .map_or("", |(_, sub)| sub);
            let subtype = subtype.split(['+', ';']).next().unwrap_or("");
            let ext = sanitize_extension(subtype);
            if ext.is_empty() { "bin".to_string() } else { ext }
        })
    }

    /// Object path for this upload: `events/{millis}_{random}.{ext}`.
    #[must_use]
    pub fn object_path(&self, now: DateTime<Utc>) -> String {
        let random: String = uuid::Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(8)
            .collect();
        format!(
            "events/{}_{random}.{}",
            now.timestamp_millis(),
            self.extension()
        )
    }
}

fn sanitize_extension(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .take(10)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, content_type: &str, size: usize) -> ImageUpload {
        ImageUpload {
            file_name: name.to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0; size],
        }
    }

    #[test]
    fn accepts_images_up_to_the_cap() {
        assert!(upload("a.png", "image/png", 5).validate(5).is_ok());
    }

    #[test]
    fn rejects_non_images() {
        assert!(matches!(
            upload("a.pdf", "application/pdf", 5).validate(10),
            Err(AdminError::InvalidImage(_))
        ));
    }

    #[test]
    fn rejects_oversized_images() {
        assert!(matches!(
            upload("a.png", "image/png", 11).validate(10),
            Err(AdminError::ImageTooLarge { size: 11, max: 10 })
        ));
    }

    #[test]
    fn extension_sources() {
        assert_eq!(upload("Photo.JPG", "image/jpeg", 1).extension(), "jpg");
        assert_eq!(upload("noext", "image/webp", 1).extension(), "webp");
        assert_eq!(upload("noext", "image/svg+xml", 1).extension(), "svg");
        assert_eq!(upload("../../x.p/n?g", "image/png", 1).extension(), "png");
    }

    #[test]
    fn object_path_shape() {
        let now = DateTime::from_timestamp_millis(1_736_089_440_000).unwrap_or_default();
        let path = upload("cover.png", "image/png", 1).object_path(now);
        assert!(path.starts_with("events/1736089440000_"));
        assert!(path.ends_with(".png"));
        assert!(!path.contains(".."));
    }
}
