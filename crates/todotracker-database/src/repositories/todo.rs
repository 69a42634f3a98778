//! Todo repository — CRUD, filtered root listing, and tree queries.
//!
//! Parent-changing writes go through transaction-scoped associated
//! functions so the hierarchy validation in the service layer observes
//! the same committed tree the write will land on.

use sqlx::postgres::Postgres;
use sqlx::{PgConnection, PgPool, QueryBuilder, Transaction};
use uuid::Uuid;

use todotracker_core::error::{AppError, ErrorKind};
use todotracker_core::result::AppResult;
use todotracker_core::types::pagination::{PageRequest, PageResponse};
use todotracker_entity::todo::{CreateTodo, Todo, TodoFilter};

/// Advisory lock key guarding the todos parent-pointer graph. Every
/// parent-changing transaction takes this lock before validating, so
/// concurrent reparents serialize and cannot jointly form a cycle.
const HIERARCHY_LOCK_KEY: i64 = 0x544F_444F;

/// A todo row annotated with its position inside a subtree query result.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TodoTreeRow {
    /// The todo row.
    #[sqlx(flatten)]
    pub todo: Todo,
    /// The root the recursive walk started from.
    pub root_id: Uuid,
    /// Edges between this row and `root_id` (0 for the root itself).
    pub rel_depth: i32,
}

/// Repository for todo CRUD and hierarchy queries.
#[derive(Debug, Clone)]
pub struct TodoRepository {
    pool: PgPool,
}

impl TodoRepository {
    /// Create a new todo repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction for a hierarchy-affecting write.
    pub async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e))
    }

    /// Find a todo by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Todo>> {
        sqlx::query_as::<_, Todo>("SELECT * FROM todos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find todo", e))
    }

    /// List root-level todos matching the filter, ordered by priority
    /// descending then due date ascending (nulls last), with the filtered
    /// total count.
    pub async fn list_roots(
        &self,
        filter: &TodoFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Todo>> {
        let mut count_query =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM todos WHERE parent_id IS NULL");
        push_filters(&mut count_query, filter);

        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count todos", e))?;

        let mut query =
            QueryBuilder::<Postgres>::new("SELECT * FROM todos WHERE parent_id IS NULL");
        push_filters(&mut query, filter);
        query.push(" ORDER BY priority DESC, due_date ASC NULLS LAST, created_at ASC");
        query.push(" LIMIT ");
        query.push_bind(page.limit() as i64);
        query.push(" OFFSET ");
        query.push_bind(page.offset() as i64);

        let todos = query
            .build_query_as::<Todo>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list todos", e))?;

        Ok(PageResponse::new(
            todos,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Load the subtrees hanging off the given roots, each walk bounded by
    /// `max_depth` edges. The roots themselves are included at depth 0.
    pub async fn find_subtrees(
        &self,
        root_ids: &[Uuid],
        max_depth: u32,
    ) -> AppResult<Vec<TodoTreeRow>> {
        if root_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, TodoTreeRow>(
            "WITH RECURSIVE tree AS ( \
                SELECT t.*, t.id AS root_id, 0 AS rel_depth \
                FROM todos t WHERE t.id = ANY($1) \
                UNION ALL \
                SELECT c.*, tree.root_id, tree.rel_depth + 1 \
                FROM todos c INNER JOIN tree ON c.parent_id = tree.id \
                WHERE tree.rel_depth < $2 \
             ) SELECT * FROM tree ORDER BY rel_depth ASC, created_at ASC",
        )
        .bind(root_ids)
        .bind(max_depth as i32)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load subtrees", e))
    }

    /// Collect the ids of a todo and all its descendants (unbounded walk,
    /// used ahead of cascade deletion).
    pub async fn subtree_ids(&self, id: Uuid) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "WITH RECURSIVE tree AS ( \
                SELECT t.id FROM todos t WHERE t.id = $1 \
                UNION ALL \
                SELECT c.id FROM todos c INNER JOIN tree ON c.parent_id = tree.id \
             ) SELECT id FROM tree",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to collect subtree ids", e))
    }

    /// Delete a todo. Cascade rules remove descendants, tag links, and
    /// attachment rows. Returns false when the todo did not exist.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete todo", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Set the completion flag and timestamp together. Re-marking an
    /// already-completed todo refreshes the timestamp.
    pub async fn set_completed(&self, id: Uuid, completed: bool) -> AppResult<Option<Todo>> {
        sqlx::query_as::<_, Todo>(
            "UPDATE todos SET \
                completed = $2, \
                completed_at = CASE WHEN $2 THEN now() ELSE NULL END, \
                updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(completed)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update completion", e))
    }

    // ── Transaction-scoped operations ────────────────────────────

    /// Serialize against every other parent-changing transaction. The lock
    /// is released automatically at commit or rollback.
    pub async fn lock_hierarchy(conn: &mut PgConnection) -> AppResult<()> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(HIERARCHY_LOCK_KEY)
            .execute(conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to lock hierarchy", e)
            })?;
        Ok(())
    }

    /// Find a todo by ID inside an open transaction.
    pub async fn find(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<Todo>> {
        sqlx::query_as::<_, Todo>("SELECT * FROM todos WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find todo", e))
    }

    /// Whether a todo row exists.
    pub async fn exists(conn: &mut PgConnection, id: Uuid) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM todos WHERE id = $1)")
            .bind(id)
            .fetch_one(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check todo", e))
    }

    /// The parent of a todo: `None` when the row is missing, `Some(None)`
    /// for a root.
    pub async fn parent_id_of(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> AppResult<Option<Option<Uuid>>> {
        sqlx::query_scalar::<_, Option<Uuid>>("SELECT parent_id FROM todos WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read parent", e))
    }

    /// Direct children of a todo.
    pub async fn child_ids(conn: &mut PgConnection, id: Uuid) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM todos WHERE parent_id = $1")
            .bind(id)
            .fetch_all(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children", e))
    }

    /// Insert a new todo row (tags are linked separately).
    pub async fn insert(conn: &mut PgConnection, data: &CreateTodo) -> AppResult<Todo> {
        sqlx::query_as::<_, Todo>(
            "INSERT INTO todos (title, description, due_date, priority, parent_id, category_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.due_date)
        .bind(data.priority)
        .bind(data.parent_id)
        .bind(data.category_id)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create todo", e))
    }

    /// Write back the scalar columns of a todo row. The parent pointer is
    /// deliberately excluded: it only moves through [`Self::set_parent`],
    /// under the hierarchy lock.
    pub async fn update_fields(conn: &mut PgConnection, todo: &Todo) -> AppResult<Todo> {
        sqlx::query_as::<_, Todo>(
            "UPDATE todos SET \
                title = $2, description = $3, due_date = $4, priority = $5, \
                completed = $6, completed_at = $7, category_id = $8, \
                updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(todo.id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.due_date)
        .bind(todo.priority)
        .bind(todo.completed)
        .bind(todo.completed_at)
        .bind(todo.category_id)
        .fetch_optional(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update todo", e))?
        .ok_or_else(|| AppError::not_found(format!("Todo {} not found", todo.id)))
    }

    /// Move a todo under a new parent (or to the root with `None`). Must
    /// only be called after validation, inside a hierarchy-locked
    /// transaction.
    pub async fn set_parent(
        conn: &mut PgConnection,
        id: Uuid,
        parent_id: Option<Uuid>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE todos SET parent_id = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(parent_id)
            .execute(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to move todo", e))?;
        Ok(())
    }

    /// Replace the tag set of a todo.
    pub async fn set_tags(
        conn: &mut PgConnection,
        todo_id: Uuid,
        tag_ids: &[Uuid],
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM todo_tags WHERE todo_id = $1")
            .bind(todo_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clear tags", e))?;

        if tag_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO todo_tags (todo_id, tag_id) \
             SELECT $1, tag_id FROM UNNEST($2::uuid[]) AS t(tag_id)",
        )
        .bind(todo_id)
        .bind(tag_ids)
        .execute(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to attach tags", e))?;

        Ok(())
    }
}

/// Append the filter clauses shared by the count and page queries.
fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &TodoFilter) {
    if let Some(category_id) = filter.category_id {
        query.push(" AND category_id = ");
        query.push_bind(category_id);
    }
    if let Some(priority_min) = filter.priority_min {
        query.push(" AND priority >= ");
        query.push_bind(priority_min);
    }
    if let Some(priority_max) = filter.priority_max {
        query.push(" AND priority <= ");
        query.push_bind(priority_max);
    }
    if let Some(completed) = filter.completed {
        query.push(" AND completed = ");
        query.push_bind(completed);
    }
    if let Some(due_before) = filter.due_before {
        query.push(" AND due_date <= ");
        query.push_bind(due_before);
    }
    if let Some(due_after) = filter.due_after {
        query.push(" AND due_date >= ");
        query.push_bind(due_after);
    }
    if let Some(tag_id) = filter.tag_id {
        query.push(
            " AND EXISTS (SELECT 1 FROM todo_tags tt WHERE tt.todo_id = todos.id AND tt.tag_id = ",
        );
        query.push_bind(tag_id);
        query.push(")");
    }
}
