//! Todo CRUD orchestration with hierarchy-safe writes and eager subtree
//! loading.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use tracing::info;
use uuid::Uuid;

use todotracker_core::config::TodoConfig;
use todotracker_core::error::AppError;
use todotracker_core::result::AppResult;
use todotracker_core::types::pagination::{PageRequest, PageResponse};
use todotracker_database::repositories::attachment::AttachmentRepository;
use todotracker_database::repositories::category::CategoryRepository;
use todotracker_database::repositories::tag::TagRepository;
use todotracker_database::repositories::todo::{TodoRepository, TodoTreeRow};
use todotracker_entity::attachment::Attachment;
use todotracker_entity::category::Category;
use todotracker_entity::tag::Tag;
use todotracker_entity::todo::{CreateTodo, Todo, TodoFilter, TodoTree};
use todotracker_storage::AttachmentStore;

use super::hierarchy;

/// A partial update to a todo.
///
/// Outer `None` means "leave unchanged"; for nullable columns the inner
/// option carries the new value, so `Some(None)` clears the field (e.g.
/// moving a subtask back to the root).
#[derive(Debug, Clone, Default)]
pub struct UpdateTodo {
    /// New title.
    pub title: Option<String>,
    /// New description (`Some(None)` clears it).
    pub description: Option<Option<String>>,
    /// New due date (`Some(None)` clears it).
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// New priority (1-10).
    pub priority: Option<i32>,
    /// New parent (`Some(None)` moves the todo to the root).
    pub parent_id: Option<Option<Uuid>>,
    /// New category (`Some(None)` clears it).
    pub category_id: Option<Option<Uuid>>,
    /// Replacement tag set.
    pub tag_ids: Option<Vec<Uuid>>,
    /// Completion change, routed through mark-complete semantics.
    pub completed: Option<bool>,
}

/// Service for todo CRUD operations.
#[derive(Debug, Clone)]
pub struct TodoService {
    /// Todo repository.
    todo_repo: Arc<TodoRepository>,
    /// Category repository (tree assembly + reference checks).
    category_repo: Arc<CategoryRepository>,
    /// Tag repository (tree assembly + all-or-nothing validation).
    tag_repo: Arc<TagRepository>,
    /// Attachment repository (tree assembly + cascade file cleanup).
    attachment_repo: Arc<AttachmentRepository>,
    /// Attachment disk store (cascade file cleanup).
    store: Arc<AttachmentStore>,
    /// Hierarchy constraints.
    config: TodoConfig,
}

impl TodoService {
    /// Creates a new todo service.
    pub fn new(
        todo_repo: Arc<TodoRepository>,
        category_repo: Arc<CategoryRepository>,
        tag_repo: Arc<TagRepository>,
        attachment_repo: Arc<AttachmentRepository>,
        store: Arc<AttachmentStore>,
        config: TodoConfig,
    ) -> Self {
        Self {
            todo_repo,
            category_repo,
            tag_repo,
            attachment_repo,
            store,
            config,
        }
    }

    /// Creates a new todo, validating the parent assignment and every
    /// referenced tag id before anything is persisted.
    pub async fn create(&self, data: CreateTodo) -> AppResult<TodoTree> {
        validate_title(&data.title)?;
        validate_priority(data.priority)?;

        let mut tx = self.todo_repo.begin().await?;

        if data.parent_id.is_some() {
            TodoRepository::lock_hierarchy(&mut tx).await?;
        }

        hierarchy::validate_parent_assignment(
            &mut tx,
            data.parent_id,
            None,
            self.config.max_subtask_depth,
        )
        .await?;

        if let Some(category_id) = data.category_id
            && !CategoryRepository::exists(&mut tx, category_id).await?
        {
            return Err(AppError::validation(format!(
                "Category '{category_id}' not found"
            )));
        }

        validate_tag_ids(&mut tx, &data.tag_ids).await?;

        let todo = TodoRepository::insert(&mut tx, &data).await?;
        if !data.tag_ids.is_empty() {
            TodoRepository::set_tags(&mut tx, todo.id, &data.tag_ids).await?;
        }

        commit(tx).await?;

        info!(todo_id = %todo.id, title = %todo.title, "Todo created");

        // Reload through the subtree path so the response has the same
        // shape as a read.
        self.get(todo.id).await
    }

    /// Fetches a todo with its full configured-depth subtree.
    pub async fn get(&self, id: Uuid) -> AppResult<TodoTree> {
        let rows = self
            .todo_repo
            .find_subtrees(&[id], self.config.max_subtask_depth)
            .await?;
        if rows.is_empty() {
            return Err(AppError::not_found("Todo not found"));
        }

        let mut trees = self.assemble_trees(rows, &[id]).await?;
        trees
            .pop()
            .ok_or_else(|| AppError::internal("Subtree assembly lost its root"))
    }

    /// Lists root-level todos matching the filters, each loaded with its
    /// full subtree, plus the filtered total count.
    pub async fn list(
        &self,
        filter: &TodoFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<TodoTree>> {
        let roots = self.todo_repo.list_roots(filter, page).await?;
        let root_ids: Vec<Uuid> = roots.items.iter().map(|t| t.id).collect();

        let rows = self
            .todo_repo
            .find_subtrees(&root_ids, self.config.max_subtask_depth)
            .await?;
        let trees = self.assemble_trees(rows, &root_ids).await?;

        Ok(PageResponse::new(
            trees,
            roots.page,
            roots.page_size,
            roots.total_items,
        ))
    }

    /// Applies a partial update. Parent changes are validated under the
    /// hierarchy lock; tag replacements are all-or-nothing; completion
    /// changes keep the completion-timestamp invariant intact.
    pub async fn update(&self, id: Uuid, patch: UpdateTodo) -> AppResult<TodoTree> {
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        if let Some(priority) = patch.priority {
            validate_priority(priority)?;
        }

        let mut tx = self.todo_repo.begin().await?;

        let mut current = TodoRepository::find(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Todo not found"))?;

        let mut reparent: Option<Option<Uuid>> = None;
        if let Some(new_parent) = patch.parent_id
            && new_parent != current.parent_id
        {
            TodoRepository::lock_hierarchy(&mut tx).await?;

            // Re-read under the lock; the tree may have moved while we
            // waited for a concurrent hierarchy write to finish.
            current = TodoRepository::find(&mut tx, id)
                .await?
                .ok_or_else(|| AppError::not_found("Todo not found"))?;

            if new_parent != current.parent_id {
                hierarchy::validate_parent_assignment(
                    &mut tx,
                    new_parent,
                    Some(id),
                    self.config.max_subtask_depth,
                )
                .await?;
                reparent = Some(new_parent);
            }
        }

        if let Some(Some(category_id)) = patch.category_id
            && !CategoryRepository::exists(&mut tx, category_id).await?
        {
            return Err(AppError::validation(format!(
                "Category '{category_id}' not found"
            )));
        }

        if let Some(tag_ids) = &patch.tag_ids {
            validate_tag_ids(&mut tx, tag_ids).await?;
        }

        let mut todo = current;
        if let Some(title) = patch.title {
            todo.title = title;
        }
        if let Some(description) = patch.description {
            todo.description = description;
        }
        if let Some(due_date) = patch.due_date {
            todo.due_date = due_date;
        }
        if let Some(priority) = patch.priority {
            todo.priority = priority;
        }
        if let Some(category_id) = patch.category_id {
            todo.category_id = category_id;
        }
        if let Some(completed) = patch.completed {
            apply_completion(&mut todo, completed);
        }

        TodoRepository::update_fields(&mut tx, &todo).await?;
        if let Some(new_parent) = reparent {
            TodoRepository::set_parent(&mut tx, id, new_parent).await?;
        }
        if let Some(tag_ids) = &patch.tag_ids {
            TodoRepository::set_tags(&mut tx, id, tag_ids).await?;
        }

        commit(tx).await?;

        info!(todo_id = %id, "Todo updated");

        self.get(id).await
    }

    /// Deletes a todo. Cascade rules remove descendants, tag links, and
    /// attachment rows; the descendants' backing files are removed
    /// afterwards (best effort).
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let subtree = self.todo_repo.subtree_ids(id).await?;
        if subtree.is_empty() {
            return Err(AppError::not_found("Todo not found"));
        }

        let filenames = self.attachment_repo.filenames_for_todos(&subtree).await?;

        if !self.todo_repo.delete(id).await? {
            return Err(AppError::not_found("Todo not found"));
        }

        for filename in &filenames {
            let _ = self.store.delete(filename).await;
        }

        info!(
            todo_id = %id,
            descendants = subtree.len() - 1,
            files = filenames.len(),
            "Todo deleted"
        );
        Ok(())
    }

    /// Marks a todo as complete, stamping the completion timestamp.
    /// Re-marking an already-completed todo refreshes the timestamp.
    pub async fn mark_complete(&self, id: Uuid) -> AppResult<TodoTree> {
        self.todo_repo
            .set_completed(id, true)
            .await?
            .ok_or_else(|| AppError::not_found("Todo not found"))?;
        self.get(id).await
    }

    /// Marks a todo as incomplete, clearing the completion timestamp.
    pub async fn mark_incomplete(&self, id: Uuid) -> AppResult<TodoTree> {
        self.todo_repo
            .set_completed(id, false)
            .await?
            .ok_or_else(|| AppError::not_found("Todo not found"))?;
        self.get(id).await
    }

    /// Adds a subtask under an existing todo.
    pub async fn add_subtask(&self, parent_id: Uuid, mut data: CreateTodo) -> AppResult<TodoTree> {
        if self.todo_repo.find_by_id(parent_id).await?.is_none() {
            return Err(AppError::not_found("Parent todo not found"));
        }
        data.parent_id = Some(parent_id);
        self.create(data).await
    }

    /// Batch-load relations for the collected subtree rows and fold them
    /// into trees, one per entry of `root_order`.
    async fn assemble_trees(
        &self,
        rows: Vec<TodoTreeRow>,
        root_order: &[Uuid],
    ) -> AppResult<Vec<TodoTree>> {
        let all_ids: Vec<Uuid> = rows.iter().map(|r| r.todo.id).collect();

        let category_ids: Vec<Uuid> = rows
            .iter()
            .filter_map(|r| r.todo.category_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let categories: HashMap<Uuid, Category> = self
            .category_repo
            .find_by_ids(&category_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut tags_by_todo: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for row in self.tag_repo.find_for_todos(&all_ids).await? {
            tags_by_todo.entry(row.todo_id).or_default().push(row.tag);
        }

        let mut attachments_by_todo: HashMap<Uuid, Vec<Attachment>> = HashMap::new();
        for attachment in self.attachment_repo.find_for_todos(&all_ids).await? {
            attachments_by_todo
                .entry(attachment.todo_id)
                .or_default()
                .push(attachment);
        }

        // Children in query order (rows arrive depth-first ordered by
        // creation time within each level).
        let mut depth_order: Vec<(Uuid, i32)> = Vec::with_capacity(rows.len());
        let mut child_ids: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for row in &rows {
            depth_order.push((row.todo.id, row.rel_depth));
            if row.rel_depth > 0
                && let Some(parent_id) = row.todo.parent_id
            {
                child_ids.entry(parent_id).or_default().push(row.todo.id);
            }
        }

        let mut nodes: HashMap<Uuid, TodoTree> = rows
            .into_iter()
            .map(|row| {
                let tree = TodoTree {
                    category: row
                        .todo
                        .category_id
                        .and_then(|cid| categories.get(&cid).cloned()),
                    tags: tags_by_todo.remove(&row.todo.id).unwrap_or_default(),
                    attachments: attachments_by_todo
                        .remove(&row.todo.id)
                        .unwrap_or_default(),
                    subtasks: Vec::new(),
                    todo: row.todo,
                };
                (tree.todo.id, tree)
            })
            .collect();

        // Attach children deepest-first so each subtree is complete before
        // it is folded into its own parent. Iterative by construction.
        depth_order.sort_by(|a, b| b.1.cmp(&a.1));
        for (id, _) in &depth_order {
            if let Some(kids) = child_ids.remove(id) {
                let mut subtasks = Vec::with_capacity(kids.len());
                for kid in kids {
                    if let Some(node) = nodes.remove(&kid) {
                        subtasks.push(node);
                    }
                }
                if let Some(parent) = nodes.get_mut(id) {
                    parent.subtasks = subtasks;
                }
            }
        }

        Ok(root_order
            .iter()
            .filter_map(|id| nodes.remove(id))
            .collect())
    }
}

/// Set or clear the completion flag and timestamp together.
fn apply_completion(todo: &mut Todo, completed: bool) {
    if completed {
        todo.completed = true;
        todo.completed_at = Some(Utc::now());
    } else {
        todo.completed = false;
        todo.completed_at = None;
    }
}

fn validate_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::validation("Title cannot be empty"));
    }
    if title.len() > 500 {
        return Err(AppError::validation("Title must be at most 500 characters"));
    }
    Ok(())
}

fn validate_priority(priority: i32) -> AppResult<()> {
    if !(1..=10).contains(&priority) {
        return Err(AppError::validation("Priority must be between 1 and 10"));
    }
    Ok(())
}

/// All-or-nothing tag validation: every id must exist, missing ids are
/// listed in the error.
async fn validate_tag_ids(conn: &mut PgConnection, tag_ids: &[Uuid]) -> AppResult<()> {
    if tag_ids.is_empty() {
        return Ok(());
    }

    let existing: HashSet<Uuid> = TagRepository::existing_ids(conn, tag_ids)
        .await?
        .into_iter()
        .collect();

    let mut missing: Vec<String> = tag_ids
        .iter()
        .filter(|id| !existing.contains(id))
        .map(Uuid::to_string)
        .collect();

    if !missing.is_empty() {
        missing.sort();
        missing.dedup();
        return Err(AppError::validation(format!(
            "Tag(s) not found: {}",
            missing.join(", ")
        )));
    }

    Ok(())
}

async fn commit(tx: sqlx::Transaction<'static, sqlx::Postgres>) -> AppResult<()> {
    tx.commit().await.map_err(|e| {
        AppError::with_source(
            todotracker_core::error::ErrorKind::Database,
            "Failed to commit transaction",
            e,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_todo() -> Todo {
        Todo {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: None,
            due_date: None,
            priority: 5,
            completed: false,
            completed_at: None,
            parent_id: None,
            category_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_completion_invariant() {
        let mut todo = sample_todo();

        apply_completion(&mut todo, true);
        assert!(todo.completed);
        assert!(todo.completed_at.is_some());

        apply_completion(&mut todo, false);
        assert!(!todo.completed);
        assert!(todo.completed_at.is_none());
    }

    #[test]
    fn test_remarking_complete_refreshes_timestamp() {
        let mut todo = sample_todo();
        apply_completion(&mut todo, true);
        let first = todo.completed_at.unwrap();

        apply_completion(&mut todo, true);
        let second = todo.completed_at.unwrap();
        assert!(second >= first);
    }

    #[test]
    fn test_title_validation() {
        assert!(validate_title("ok").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(501)).is_err());
    }

    #[test]
    fn test_priority_validation() {
        assert!(validate_priority(1).is_ok());
        assert!(validate_priority(10).is_ok());
        assert!(validate_priority(0).is_err());
        assert!(validate_priority(11).is_err());
    }
}
