//! Attachment ingestion, retrieval, and deletion.
//!
//! Uploads run a strictly ordered validation pipeline (size, filename,
//! extension, content signature, owner) before anything is persisted.
//! The persist step is a two-resource saga: the row is inserted into an
//! open transaction first, then the bytes are written to disk. A failed
//! disk write rolls the row back; a failed commit after a successful
//! write compensates by deleting the file. Either way the database and
//! the filesystem never reference each other's missing half.

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use todotracker_core::config::StorageConfig;
use todotracker_core::error::{AppError, ErrorKind};
use todotracker_core::result::AppResult;
use todotracker_database::repositories::attachment::AttachmentRepository;
use todotracker_database::repositories::todo::TodoRepository;
use todotracker_entity::attachment::{Attachment, CreateAttachment};
use todotracker_storage::mime::mime_for_extension;
use todotracker_storage::sanitize::{extension_of, sanitize_filename};
use todotracker_storage::signature::signature_matches;
use todotracker_storage::AttachmentStore;

/// Service for file attachment operations.
#[derive(Debug, Clone)]
pub struct AttachmentService {
    /// Attachment repository.
    repo: Arc<AttachmentRepository>,
    /// Todo repository (owner existence check).
    todo_repo: Arc<TodoRepository>,
    /// Attachment disk store.
    store: Arc<AttachmentStore>,
    /// Upload limits and allow-list.
    config: StorageConfig,
}

impl AttachmentService {
    /// Creates a new attachment service.
    pub fn new(
        repo: Arc<AttachmentRepository>,
        todo_repo: Arc<TodoRepository>,
        store: Arc<AttachmentStore>,
        config: StorageConfig,
    ) -> Self {
        Self {
            repo,
            todo_repo,
            store,
            config,
        }
    }

    /// Validates and durably stores an untrusted upload for a todo.
    pub async fn save(
        &self,
        todo_id: Uuid,
        original_name: &str,
        claimed_mime: Option<&str>,
        data: Bytes,
    ) -> AppResult<Attachment> {
        // 1. Size limit.
        if data.len() as u64 > self.config.max_upload_size_bytes {
            return Err(AppError::payload_too_large(format!(
                "File size exceeds maximum allowed size of {:.1} MB",
                self.config.max_upload_size_mb()
            )));
        }

        // 2. Filename sanitization.
        let safe_name = sanitize_filename(original_name)?;

        // 3. Extension allow-list.
        let extension = extension_of(&safe_name)
            .ok_or_else(|| AppError::validation("File has no extension"))?;
        if !self.config.allowed_extensions.iter().any(|e| e == &extension) {
            return Err(AppError::validation(format!(
                "File type '.{extension}' is not allowed"
            )));
        }

        // 4. Content signature. Plain-text formats have no rule and skip.
        if let Some(matched) = signature_matches(&extension, &data)
            && !matched
        {
            return Err(AppError::validation(format!(
                "File content does not match its '.{extension}' type"
            )));
        }

        let mime_type = claimed_mime
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .or_else(|| mime_for_extension(&extension).map(str::to_string))
            .unwrap_or_else(|| "application/octet-stream".to_string());

        // The storage name carries the validated extension, never a raw
        // client-supplied suffix.
        let filename = AttachmentStore::generate_filename(&extension);

        // 5. Owner existence check, inside the persist transaction.
        let mut tx = self.repo.begin().await?;
        if !TodoRepository::exists(&mut tx, todo_id).await? {
            return Err(AppError::not_found("Todo not found"));
        }

        // 6. Two-phase persist: row first, flushed to the transaction,
        //    then the file bytes.
        let record = AttachmentRepository::insert(
            &mut tx,
            &CreateAttachment {
                todo_id,
                filename: filename.clone(),
                original_name: safe_name,
                mime_type,
                size_bytes: data.len() as i64,
            },
        )
        .await?;

        if let Err(write_err) = self.store.write(&filename, &data).await {
            // Undo the row so nothing refers to a nonexistent file.
            let _ = tx.rollback().await;
            warn!(%todo_id, filename, "Attachment disk write failed, row rolled back");
            return Err(write_err);
        }

        if let Err(commit_err) = tx.commit().await {
            // The row is gone with the failed transaction; reclaim the
            // freshly written file.
            let _ = self.store.delete(&filename).await;
            return Err(AppError::with_source(
                ErrorKind::Database,
                "Failed to commit attachment",
                commit_err,
            ));
        }

        info!(
            attachment_id = %record.id,
            todo_id = %todo_id,
            name = %record.original_name,
            size = record.size_bytes,
            "Attachment stored"
        );

        Ok(record)
    }

    /// Returns an attachment record and its file bytes.
    ///
    /// A dangling row whose backing file is missing is indistinguishable
    /// from a missing row at this boundary.
    pub async fn get(&self, id: Uuid) -> AppResult<(Attachment, Bytes)> {
        let record = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Attachment not found"))?;

        let data = self.store.read(&record.filename).await.map_err(|e| {
            if e.kind == ErrorKind::NotFound {
                AppError::not_found("Attachment not found")
            } else {
                e
            }
        })?;

        Ok((record, data))
    }

    /// Deletes an attachment: file first (best effort), then the row.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let record = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Attachment not found"))?;

        if let Err(e) = self.store.delete(&record.filename).await {
            warn!(attachment_id = %id, error = %e, "Failed to delete attachment file");
        }

        if !self.repo.delete(id).await? {
            return Err(AppError::not_found("Attachment not found"));
        }

        info!(attachment_id = %id, "Attachment deleted");
        Ok(())
    }

    /// Removes disk files no attachment row references.
    ///
    /// This is the rollback leg of the persist saga: a request aborted
    /// after its disk write leaves a file whose row never committed. Run
    /// at startup, before requests are served, so an in-flight upload
    /// cannot be mistaken for an orphan.
    pub async fn sweep_orphans(&self) -> AppResult<u64> {
        let referenced: HashSet<String> =
            self.repo.all_filenames().await?.into_iter().collect();

        let mut removed = 0u64;
        for filename in self.store.list().await? {
            if !referenced.contains(&filename) {
                self.store.delete(&filename).await?;
                removed += 1;
            }
        }

        if removed > 0 {
            info!(removed, "Removed orphaned attachment files");
        }
        Ok(removed)
    }
}
