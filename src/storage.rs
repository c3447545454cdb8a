//! Object storage seam used to make generated documents publicly reachable.
//!
//! The hosted-URL delivery adapter needs the PDF at a public URL before it
//! can reference it in a send call. The default backend writes to the local
//! uploads directory, which the server itself serves under `/uploads`; a
//! bucket/CDN backend can be swapped in behind the same trait.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write object: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store the bytes under `filename` and return the public URL they are
    /// reachable at.
    async fn upload_file(&self, filename: &str, bytes: &[u8]) -> Result<String, StorageError>;
}

/// Filesystem-backed storage rooted at the uploads directory.
pub struct LocalStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn object_path(&self, filename: &str) -> PathBuf {
        self.root.join(sanitize_filename::sanitize(filename))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn upload_file(&self, filename: &str, bytes: &[u8]) -> Result<String, StorageError> {
        // Uploads directory is created on demand.
        tokio::fs::create_dir_all(&self.root).await?;
        let safe_name = sanitize_filename::sanitize(filename);
        let path = self.root.join(&safe_name);
        tokio::fs::write(&path, bytes).await?;
        log::debug!("stored object {} ({} bytes)", path.display(), bytes.len());
        Ok(format!("{}/uploads/{}", self.public_base_url, safe_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_creates_directory_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("uploads");
        let storage = LocalStorage::new(&root, "http://127.0.0.1:8080/");

        let url = storage
            .upload_file("invoice-1-2.pdf", b"%PDF-1.4 test")
            .await
            .unwrap();

        assert_eq!(url, "http://127.0.0.1:8080/uploads/invoice-1-2.pdf");
        let written = std::fs::read(root.join("invoice-1-2.pdf")).unwrap();
        assert_eq!(written, b"%PDF-1.4 test");
    }

    #[tokio::test]
    async fn test_upload_sanitizes_filename() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost");
        storage.upload_file("../escape.pdf", b"data").await.unwrap();

        // Sanitizing strips the separator, so the written file stays directly
        // under the uploads root instead of one level above it.
        let path = storage.object_path("../escape.pdf");
        assert_eq!(path.parent(), Some(dir.path()));
        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, b"data");
        assert!(!dir.path().parent().unwrap().join("escape.pdf").exists());
    }
}
