//! Attachment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A file attachment owned by a todo.
///
/// `filename` is the generated on-disk name; `original_name` is the
/// sanitized client-supplied name kept as metadata only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attachment {
    /// Unique attachment identifier.
    pub id: Uuid,
    /// The todo this attachment belongs to.
    pub todo_id: Uuid,
    /// Generated storage filename within the attachments directory.
    pub filename: String,
    /// Sanitized original filename as supplied by the client.
    pub original_name: String,
    /// MIME type of the file.
    pub mime_type: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// When the file was uploaded.
    pub uploaded_at: DateTime<Utc>,
}

/// Data required to create a new attachment row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAttachment {
    /// The owning todo.
    pub todo_id: Uuid,
    /// Generated storage filename.
    pub filename: String,
    /// Sanitized original filename.
    pub original_name: String,
    /// MIME type.
    pub mime_type: String,
    /// File size in bytes.
    pub size_bytes: i64,
}
