//! On-disk layout for uploads and finished artifacts.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use intens_models::{sanitize_filename, ImageId};

use crate::error::{StorageError, StorageResult};
use crate::fs::move_file;

/// Local store holding raw uploads and published artifacts.
///
/// Uploads are kept as `{id}-{sanitized-original-filename}` for later
/// inspection; artifacts are served from `{id}.gif`. An artifact only
/// ever appears at its final path complete, via [`LocalStore::publish_artifact`].
#[derive(Debug, Clone)]
pub struct LocalStore {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

impl LocalStore {
    /// Open the store, creating both directories if needed.
    pub async fn open(
        upload_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> StorageResult<Self> {
        let upload_dir = upload_dir.into();
        let output_dir = output_dir.into();
        for dir in [&upload_dir, &output_dir] {
            fs::create_dir_all(dir).await.map_err(|e| {
                StorageError::config_error(format!("cannot create {}: {e}", dir.display()))
            })?;
        }
        Ok(Self {
            upload_dir,
            output_dir,
        })
    }

    /// Path a raw upload is stored at.
    pub fn upload_path(&self, id: &ImageId, original_name: &str) -> PathBuf {
        self.upload_dir
            .join(format!("{id}-{}", sanitize_filename(original_name)))
    }

    /// Path the finished artifact is served from.
    pub fn artifact_path(&self, id: &ImageId) -> PathBuf {
        self.output_dir.join(format!("{id}.gif"))
    }

    /// Persist the raw upload bytes.
    pub async fn save_upload(
        &self,
        id: &ImageId,
        original_name: &str,
        bytes: &[u8],
    ) -> StorageResult<PathBuf> {
        let path = self.upload_path(id, original_name);
        fs::write(&path, bytes).await?;
        debug!(id = %id, path = %path.display(), "saved upload");
        Ok(path)
    }

    /// Move a finished artifact from its staging path to the served path.
    pub async fn publish_artifact(&self, staged: &Path, id: &ImageId) -> StorageResult<PathBuf> {
        let path = self.artifact_path(id);
        move_file(staged, &path).await?;
        debug!(id = %id, path = %path.display(), "published artifact");
        Ok(path)
    }

    /// Read a published artifact.
    pub async fn read_artifact(&self, id: &ImageId) -> StorageResult<Vec<u8>> {
        let path = self.artifact_path(id);
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::not_found(id.as_str()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store() -> (TempDir, LocalStore) {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path().join("uploads"), dir.path().join("intensified"))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_open_creates_directories() {
        let (dir, _store) = store().await;
        assert!(dir.path().join("uploads").is_dir());
        assert!(dir.path().join("intensified").is_dir());
    }

    #[tokio::test]
    async fn test_upload_naming_sanitizes_original_filename() {
        let (_dir, store) = store().await;
        let id = ImageId::parse("abc123").unwrap();
        let path = store.upload_path(&id, "../../evil cat.png");
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "abc123-evil_cat.png"
        );
        assert!(path.starts_with(_dir.path().join("uploads")));
    }

    #[tokio::test]
    async fn test_publish_then_read_roundtrip() {
        let (dir, store) = store().await;
        let id = ImageId::parse("abc123").unwrap();

        let staged = dir.path().join("staged.gif");
        fs::write(&staged, b"GIF89a...").await.unwrap();
        let published = store.publish_artifact(&staged, &id).await.unwrap();

        assert_eq!(
            published.file_name().unwrap().to_string_lossy(),
            "abc123.gif"
        );
        assert!(!staged.exists());
        assert_eq!(store.read_artifact(&id).await.unwrap(), b"GIF89a...");
    }

    #[tokio::test]
    async fn test_read_unknown_artifact_is_not_found() {
        let (_dir, store) = store().await;
        let id = ImageId::parse("missing0000").unwrap();
        let err = store.read_artifact(&id).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_save_upload_writes_bytes() {
        let (_dir, store) = store().await;
        let id = ImageId::parse("abc123").unwrap();
        let path = store.save_upload(&id, "photo.jpg", b"jpeg").await.unwrap();
        assert_eq!(fs::read(&path).await.unwrap(), b"jpeg");
    }
}
