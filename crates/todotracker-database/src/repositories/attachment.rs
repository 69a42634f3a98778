//! Attachment repository implementation.

use sqlx::postgres::Postgres;
use sqlx::{PgConnection, PgPool, Transaction};
use uuid::Uuid;

use todotracker_core::error::{AppError, ErrorKind};
use todotracker_core::result::AppResult;
use todotracker_entity::attachment::{Attachment, CreateAttachment};

/// Repository for attachment metadata rows.
#[derive(Debug, Clone)]
pub struct AttachmentRepository {
    pool: PgPool,
}

impl AttachmentRepository {
    /// Create a new attachment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction for the row-then-file persist sequence.
    pub async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })
    }

    /// Find an attachment by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Attachment>> {
        sqlx::query_as::<_, Attachment>("SELECT * FROM attachments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find attachment", e))
    }

    /// Load the attachments owned by any of the given todos, for tree
    /// assembly.
    pub async fn find_for_todos(&self, todo_ids: &[Uuid]) -> AppResult<Vec<Attachment>> {
        if todo_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Attachment>(
            "SELECT * FROM attachments WHERE todo_id = ANY($1) ORDER BY uploaded_at ASC",
        )
        .bind(todo_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load attachments", e))
    }

    /// Storage filenames for every attachment owned by the given todos.
    /// Collected before a cascade delete so the backing files can be
    /// removed afterwards.
    pub async fn filenames_for_todos(&self, todo_ids: &[Uuid]) -> AppResult<Vec<String>> {
        if todo_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_scalar::<_, String>("SELECT filename FROM attachments WHERE todo_id = ANY($1)")
            .bind(todo_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to collect filenames", e)
            })
    }

    /// Every storage filename referenced by the attachments table. Used by
    /// the orphaned-file sweep.
    pub async fn all_filenames(&self) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT filename FROM attachments")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list filenames", e)
            })
    }

    /// Delete an attachment row. Returns false when the row did not exist.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM attachments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete attachment", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert a new attachment row (transaction-scoped — the row is
    /// flushed to the transaction before the file bytes hit the disk).
    pub async fn insert(conn: &mut PgConnection, data: &CreateAttachment) -> AppResult<Attachment> {
        sqlx::query_as::<_, Attachment>(
            "INSERT INTO attachments (todo_id, filename, original_name, mime_type, size_bytes) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(data.todo_id)
        .bind(&data.filename)
        .bind(&data.original_name)
        .bind(&data.mime_type)
        .bind(data.size_bytes)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create attachment", e))
    }
}
