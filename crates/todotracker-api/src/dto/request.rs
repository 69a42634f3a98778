//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;
use validator::Validate;

use todotracker_entity::todo::CreateTodo;
use todotracker_service::UpdateTodo;

/// Deserialize helper distinguishing an absent field from an explicit
/// `null`: absent stays `None`, present (even as null) becomes `Some(..)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Create todo request body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTodoRequest {
    /// Todo title.
    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Due timestamp.
    pub due_date: Option<DateTime<Utc>>,
    /// Priority (1-10, default 5).
    #[serde(default = "default_priority")]
    #[validate(range(min = 1, max = 10, message = "Priority must be between 1 and 10"))]
    pub priority: i32,
    /// Parent todo for subtasks.
    pub parent_id: Option<Uuid>,
    /// Category reference.
    pub category_id: Option<Uuid>,
    /// Tags to attach.
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

fn default_priority() -> i32 {
    5
}

impl From<CreateTodoRequest> for CreateTodo {
    fn from(req: CreateTodoRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            priority: req.priority,
            parent_id: req.parent_id,
            category_id: req.category_id,
            tag_ids: req.tag_ids,
        }
    }
}

/// Update todo request body (PUT and PATCH). Absent fields stay
/// unchanged; explicit nulls clear nullable fields (e.g.
/// `"parent_id": null` moves a subtask back to the root).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodoRequest {
    /// New title.
    pub title: Option<String>,
    /// New description.
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    /// New due timestamp.
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// New priority.
    pub priority: Option<i32>,
    /// New parent.
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<Uuid>>,
    /// New category.
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<Uuid>>,
    /// Replacement tag set.
    pub tag_ids: Option<Vec<Uuid>>,
    /// Completion change.
    pub completed: Option<bool>,
}

impl From<UpdateTodoRequest> for UpdateTodo {
    fn from(req: UpdateTodoRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            priority: req.priority,
            parent_id: req.parent_id,
            category_id: req.category_id,
            tag_ids: req.tag_ids,
            completed: req.completed,
        }
    }
}

/// Todo list filter query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoFilterParams {
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

impl From<TodoFilterParams> for todotracker_entity::todo::TodoFilter {
    fn from(params: TodoFilterParams) -> Self {
        Self {
            category_id: params.category_id,
            tag_id: params.tag_id,
            priority_min: params.priority_min,
            priority_max: params.priority_max,
            completed: params.completed,
            due_before: params.due_before,
            due_after: params.due_after,
        }
    }
}

/// Create category request body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    /// Category name (unique).
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    /// Hex color.
    pub color: Option<String>,
    /// Icon label.
    pub icon: Option<String>,
}

/// Update category request body. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategoryRequest {
    /// New name.
    pub name: Option<String>,
    /// New color.
    pub color: Option<String>,
    /// New icon.
    pub icon: Option<String>,
}

/// Create tag request body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTagRequest {
    /// Tag name (unique).
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,
    /// Hex color.
    pub color: Option<String>,
}

/// Update tag request body. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTagRequest {
    /// New name.
    pub name: Option<String>,
    /// New color.
    pub color: Option<String>,
}

/// Update priority level request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePriorityRequest {
    /// New display name.
    pub name: Option<String>,
    /// New color.
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_distinguishes_absent_from_null() {
        let absent: UpdateTodoRequest = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(absent.parent_id, None);

        let null: UpdateTodoRequest =
            serde_json::from_str(r#"{"parent_id": null}"#).unwrap();
        assert_eq!(null.parent_id, Some(None));

        let set: UpdateTodoRequest =
            serde_json::from_str(r#"{"parent_id": "7c34e0cd-7a6f-4fc3-8d26-3c274f2d6979"}"#)
                .unwrap();
        assert!(matches!(set.parent_id, Some(Some(_))));
    }

    #[test]
    fn test_create_defaults_priority() {
        let req: CreateTodoRequest = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(req.priority, 5);
        assert!(req.tag_ids.is_empty());
    }
}
