//! Local filesystem store for attachment files.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use todotracker_core::error::{AppError, ErrorKind};
use todotracker_core::result::AppResult;

/// Stores attachment files flat under a configured root directory.
///
/// Files are only ever addressed by their generated storage filename,
/// never by a client-supplied name.
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    /// Root directory for all stored files.
    root: PathBuf,
}

impl AttachmentStore {
    /// Create a new store rooted at the given path, creating it if needed.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create attachments root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// The root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Generate a collision-resistant storage filename carrying the
    /// validated extension.
    pub fn generate_filename(extension: &str) -> String {
        format!("{}.{extension}", Uuid::new_v4())
    }

    fn resolve(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Write a file. Fails if the bytes cannot be fully persisted.
    pub async fn write(&self, filename: &str, data: &Bytes) -> AppResult<()> {
        let path = self.resolve(filename);
        fs::write(&path, data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write file: {filename}"),
                e,
            )
        })?;
        debug!(filename, bytes = data.len(), "Wrote attachment file");
        Ok(())
    }

    /// Read a file's full contents.
    pub async fn read(&self, filename: &str) -> AppResult<Bytes> {
        let path = self.resolve(filename);
        let data = fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("File not found: {filename}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read file: {filename}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    /// Whether the file exists on disk.
    pub async fn exists(&self, filename: &str) -> bool {
        fs::try_exists(self.resolve(filename)).await.unwrap_or(false)
    }

    /// Delete a file. Missing files are not an error.
    pub async fn delete(&self, filename: &str) -> AppResult<()> {
        let path = self.resolve(filename);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete file: {filename}"),
                e,
            )),
        }
    }

    /// List every filename currently present in the store. Used by the
    /// orphaned-file sweep.
    pub async fn list(&self) -> AppResult<Vec<String>> {
        let mut names = Vec::new();
        let mut dir = fs::read_dir(&self.root).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to list attachments dir", e)
        })?;

        while let Some(entry) = dir.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
        })? {
            let meta = entry.metadata().await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to get entry metadata", e)
            })?;
            if meta.is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        let data = Bytes::from("hello world");
        store.write("file.txt", &data).await.unwrap();

        assert!(store.exists("file.txt").await);
        assert_eq!(store.read("file.txt").await.unwrap(), data);

        store.delete("file.txt").await.unwrap();
        assert!(!store.exists("file.txt").await);
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        let err = store.read("nope.bin").await.unwrap_err();
        assert_eq!(err.kind, todotracker_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();
        store.delete("never-existed.bin").await.unwrap();
    }

    #[tokio::test]
    async fn test_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        store.write("a.txt", &Bytes::from("a")).await.unwrap();
        store.write("b.txt", &Bytes::from("b")).await.unwrap();

        let mut names = store.list().await.unwrap();
        names.sort();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_generated_filenames_are_unique() {
        let a = AttachmentStore::generate_filename("pdf");
        let b = AttachmentStore::generate_filename("pdf");
        assert_ne!(a, b);
        assert!(a.ends_with(".pdf"));
    }
}
