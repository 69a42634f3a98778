//! Category entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A category for organizing todos.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    /// Unique category identifier.
    pub id: Uuid,
    /// Unique category name.
    pub name: String,
    /// Hex color like `#FF0000`.
    pub color: Option<String>,
    /// Icon label.
    pub icon: Option<String>,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    /// Category name (unique).
    pub name: String,
    /// Hex color.
    pub color: Option<String>,
    /// Icon label.
    pub icon: Option<String>,
}
