//! Tag entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A tag for flexible labeling of todos (many-to-many).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    /// Unique tag identifier.
    pub id: Uuid,
    /// Unique tag name.
    pub name: String,
    /// Hex color like `#00FF00`.
    pub color: Option<String>,
    /// When the tag was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTag {
    /// Tag name (unique).
    pub name: String,
    /// Hex color.
    pub color: Option<String>,
}
