//! Tag repository implementation.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use todotracker_core::error::{AppError, ErrorKind};
use todotracker_core::result::AppResult;
use todotracker_entity::tag::{CreateTag, Tag};

/// A tag row joined with the todo it is attached to (batch load shape).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TodoTagRow {
    /// The todo carrying the tag.
    pub todo_id: Uuid,
    /// The tag itself.
    #[sqlx(flatten)]
    pub tag: Tag,
}

/// Repository for tag CRUD and todo-tag association queries.
#[derive(Debug, Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    /// Create a new tag repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all tags ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tags", e))
    }

    /// Find a tag by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find tag", e))
    }

    /// Load the tags attached to any of the given todos, for tree assembly.
    pub async fn find_for_todos(&self, todo_ids: &[Uuid]) -> AppResult<Vec<TodoTagRow>> {
        if todo_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, TodoTagRow>(
            "SELECT tt.todo_id, t.* FROM todo_tags tt \
             INNER JOIN tags t ON t.id = tt.tag_id \
             WHERE tt.todo_id = ANY($1) ORDER BY t.name ASC",
        )
        .bind(todo_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load todo tags", e))
    }

    /// Create a new tag.
    pub async fn create(&self, data: &CreateTag) -> AppResult<Tag> {
        sqlx::query_as::<_, Tag>("INSERT INTO tags (name, color) VALUES ($1, $2) RETURNING *")
            .bind(&data.name)
            .bind(&data.color)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err)
                    if db_err.constraint() == Some("tags_name_key") =>
                {
                    AppError::conflict(format!("Tag '{}' already exists", data.name))
                }
                _ => AppError::with_source(ErrorKind::Database, "Failed to create tag", e),
            })
    }

    /// Update a tag. Only non-`None` fields change.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        color: Option<&str>,
    ) -> AppResult<Option<Tag>> {
        sqlx::query_as::<_, Tag>(
            "UPDATE tags SET \
                name = COALESCE($2, name), \
                color = COALESCE($3, color) \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(color)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("tags_name_key") => {
                AppError::conflict("Another tag already uses that name")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to update tag", e),
        })
    }

    /// Delete a tag. Todo associations are removed by cascade; the todos
    /// themselves are untouched.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete tag", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Return which of the given tag ids actually exist
    /// (transaction-scoped, used for all-or-nothing validation).
    pub async fn existing_ids(conn: &mut PgConnection, ids: &[Uuid]) -> AppResult<Vec<Uuid>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM tags WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check tags", e))
    }
}
