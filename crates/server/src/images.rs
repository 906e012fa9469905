//! Stored-image handling: save uploads under the image directory, release
//! replaced or deleted files.
//!
//! Stored paths handed to clients look like `images/<uuid>.<ext>` and are
//! served statically; only the file name component is ever resolved against
//! the directory on disk.

use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

use crate::error::{ApiError, FieldError, Result};

/// Accepted upload types, checked by both file extension and declared
/// content type.
const ALLOWED_EXTENSIONS: [&str; 3] = ["jpeg", "jpg", "png"];
const ALLOWED_CONTENT_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

/// URL prefix under which stored images are served.
pub const URL_PREFIX: &str = "images";

pub fn is_allowed_image(filename: &str, content_type: &str) -> bool {
    let ext_ok = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| ALLOWED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    let type_ok = ALLOWED_CONTENT_TYPES.contains(&content_type);

    ext_ok && type_ok
}

#[derive(Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_dir(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Validate and persist an upload, rejecting anything that is not a
    /// JPEG/JPG/PNG by both extension and declared content type.
    pub async fn save_upload(
        &self,
        original_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<String> {
        if !is_allowed_image(original_name, content_type) {
            return Err(ApiError::validation(vec![FieldError::new(
                "Only jpeg, jpg & png files are allowed.",
            )]));
        }
        self.save(original_name, data).await
    }

    /// Persist an upload under a fresh name, keeping the original extension.
    /// Returns the stored path to hand back to the caller.
    async fn save(&self, original_name: &str, data: &[u8]) -> Result<String> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("jpg")
            .to_ascii_lowercase();
        let filename = format!("{}.{}", Uuid::new_v4(), ext);

        tokio::fs::write(self.root.join(&filename), data).await?;

        Ok(format!("{}/{}", URL_PREFIX, filename))
    }

    /// Release a stored image. Best-effort: a missing file is logged, not an
    /// error, so delete flows never fail over an already-gone image.
    pub async fn remove(&self, stored_path: &str) {
        let Some(filename) = Path::new(stored_path).file_name() else {
            warn!("refusing to clear image with no file name: {}", stored_path);
            return;
        };

        if let Err(e) = tokio::fs::remove_file(self.root.join(filename)).await {
            warn!("failed to clear image {}: {}", stored_path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_jpeg_jpg_png_with_matching_type() {
        assert!(is_allowed_image("photo.jpg", "image/jpeg"));
        assert!(is_allowed_image("photo.JPEG", "image/jpeg"));
        // Some clients declare the nonstandard image/jpg.
        assert!(is_allowed_image("photo.jpg", "image/jpg"));
        assert!(is_allowed_image("pixel.png", "image/png"));
    }

    #[test]
    fn rejects_when_either_check_fails() {
        assert!(!is_allowed_image("photo.gif", "image/gif"));
        assert!(!is_allowed_image("photo.jpg", "image/gif"));
        assert!(!is_allowed_image("photo.gif", "image/jpeg"));
        assert!(!is_allowed_image("photo.gif", "image/jpg"));
        assert!(!is_allowed_image("noextension", "image/png"));
    }

    #[tokio::test]
    async fn save_and_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let path = store
            .save_upload("cat.png", "image/png", b"not really a png")
            .await
            .unwrap();
        assert!(path.starts_with("images/"));
        assert!(path.ends_with(".png"));

        let on_disk = dir.path().join(path.rsplit('/').next().unwrap());
        assert!(on_disk.exists());

        store.remove(&path).await;
        assert!(!on_disk.exists());

        // Removing again is quiet.
        store.remove(&path).await;
    }

    #[tokio::test]
    async fn save_upload_rejects_disallowed_types() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let err = store
            .save_upload("anim.gif", "image/gif", b"gif89a")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
    }
}
