//! Todo entity model — the core entity of ToDoTracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::attachment::Attachment;
use crate::category::Category;
use crate::tag::Tag;

/// A todo item, possibly nested under a parent todo as a subtask.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Todo {
    /// Unique todo identifier.
    pub id: Uuid,
    /// The todo title.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// When the todo is due, if scheduled.
    pub due_date: Option<DateTime<Utc>>,
    /// Priority level (1-10).
    pub priority: i32,
    /// Whether the todo has been completed.
    pub completed: bool,
    /// When the todo was completed. Set iff `completed` is true.
    pub completed_at: Option<DateTime<Utc>>,
    /// The parent todo, when this todo is a subtask.
    pub parent_id: Option<Uuid>,
    /// The category this todo belongs to, if any.
    pub category_id: Option<Uuid>,
    /// When the todo was created.
    pub created_at: DateTime<Utc>,
    /// When the todo was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Whether this todo sits at the root of the hierarchy.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Data required to create a new todo row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    /// The todo title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional due timestamp.
    pub due_date: Option<DateTime<Utc>>,
    /// Priority level (1-10).
    pub priority: i32,
    /// Parent todo for subtasks.
    pub parent_id: Option<Uuid>,
    /// Category reference.
    pub category_id: Option<Uuid>,
    /// Tags to attach. All ids must exist; validated before insert.
    pub tag_ids: Vec<Uuid>,
}

/// A todo with its relations and recursively loaded subtasks.
///
/// This is the read shape returned by all single-todo and list endpoints,
/// so clients never need a second round trip for nested data.
#[derive(Debug, Clone, Serialize)]
pub struct TodoTree {
    /// The todo row itself.
    #[serde(flatten)]
    pub todo: Todo,
    /// The resolved category, if one is set.
    pub category: Option<Category>,
    /// Tags attached to this todo.
    pub tags: Vec<Tag>,
    /// Attachments owned by this todo.
    pub attachments: Vec<Attachment>,
    /// Child subtasks, loaded to the configured depth.
    pub subtasks: Vec<TodoTree>,
}

/// Filters for todo list queries. All fields combine with AND.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoFilter {
    /// Only todos in this category.
    pub category_id: Option<Uuid>,
    /// Only todos carrying this tag.
    pub tag_id: Option<Uuid>,
    /// Minimum priority (inclusive).
    pub priority_min: Option<i32>,
    /// Maximum priority (inclusive).
    pub priority_max: Option<i32>,
    /// Completion flag filter.
    pub completed: Option<bool>,
    /// Only todos due at or before this instant.
    pub due_before: Option<DateTime<Utc>>,
    /// Only todos due at or after this instant.
    pub due_after: Option<DateTime<Utc>>,
}
