//! Image intake: validates uploaded listing images and persists them under
//! the upload root with a collision-resistant name.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use rand::Rng;

use crate::error::AppError;

/// Largest accepted image, in bytes (4 MiB).
pub const MAX_IMAGE_BYTES: usize = 4 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "webp"];
const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// A file field pulled out of a multipart request.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Clone, Debug)]
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

    pub async fn ensure_root(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Validate and store an upload, returning the stored filename (relative to the root).
    ///
    /// A name collision overwrites the existing file.
    pub async fn accept(&self, upload: ImageUpload) -> Result<String, AppError> {
        let extension = validate(&upload)?;
        let filename = generate_filename(&extension);

        self.ensure_root().await?;
        tokio::fs::write(self.root.join(&filename), &upload.data).await?;

        tracing::debug!(%filename, bytes = upload.data.len(), "image stored");
        Ok(filename)
    }

    /// Best-effort removal of a stored image. Failures are logged, never returned.
    pub async fn remove(&self, filename: &str) {
        if !is_plain_filename(filename) {
            tracing::warn!(%filename, "refusing to unlink suspicious image path");
            return;
        }

        let path = self.root.join(filename);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(%filename, "image removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(%filename, "image already gone")
            }
            Err(e) => tracing::warn!(%filename, "failed to remove image: {}", e),
        }
    }
}

/// Check type and size, returning the normalized extension.
fn validate(upload: &ImageUpload) -> Result<String, AppError> {
    if upload.data.len() > MAX_IMAGE_BYTES {
        return Err(AppError::InvalidFile(format!(
            "Image exceeds the {} MiB limit",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }

    let extension = upload
        .file_name
        .as_deref()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| {
            AppError::InvalidFile("Only jpeg, jpg, png and webp images are allowed".to_string())
        })?;

    let mime = upload
        .content_type
        .as_deref()
        .map(|ct| ct.to_ascii_lowercase())
        .unwrap_or_default();

    if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
        return Err(AppError::InvalidFile(format!(
            "Unsupported image type '{}'",
            mime
        )));
    }

    Ok(extension)
}

/// `<millis>-<12 hex chars>.<ext>`
fn generate_filename(extension: &str) -> String {
    let suffix: [u8; 6] = rand::thread_rng().gen();
    format!(
        "{}-{}.{}",
        chrono::Utc::now().timestamp_millis(),
        hex::encode(suffix),
        extension
    )
}

fn is_plain_filename(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, mime: &str, len: usize) -> ImageUpload {
        ImageUpload {
            file_name: Some(name.to_string()),
            content_type: Some(mime.to_string()),
            data: Bytes::from(vec![0u8; len]),
        }
    }

    #[tokio::test]
    async fn test_accept_png() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let filename = store.accept(upload("photo.PNG", "image/png", 128)).await.unwrap();
        assert!(filename.ends_with(".png"));
        assert!(dir.path().join(&filename).exists());

        let (stamp, rest) = filename.split_once('-').unwrap();
        assert!(stamp.parse::<i64>().is_ok());
        let (suffix, ext) = rest.split_once('.').unwrap();
        assert_eq!(suffix.len(), 12);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(ext, "png");
    }

    #[tokio::test]
    async fn test_reject_exe() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let err = store
            .accept(upload("setup.exe", "application/octet-stream", 16))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFile(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_reject_mismatched_mime() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let err = store.accept(upload("photo.png", "text/html", 16)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidFile(_)));
    }

    #[tokio::test]
    async fn test_reject_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let err = store
            .accept(upload("big.jpg", "image/jpeg", MAX_IMAGE_BYTES + 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFile(_)));

        store
            .accept(upload("edge.jpg", "image/jpeg", MAX_IMAGE_BYTES))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_remove_is_best_effort() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let filename = store.accept(upload("a.webp", "image/webp", 8)).await.unwrap();
        store.remove(&filename).await;
        assert!(!dir.path().join(&filename).exists());

        // Missing files and traversal attempts are swallowed
        store.remove(&filename).await;
        store.remove("../etc/passwd").await;
    }
}
