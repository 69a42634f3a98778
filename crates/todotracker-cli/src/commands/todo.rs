//! Todo management CLI commands.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use todotracker_api::AppState;
use todotracker_core::error::AppError;
use todotracker_core::types::pagination::PageRequest;
use todotracker_entity::category::CreateCategory;
use todotracker_entity::tag::CreateTag;
use todotracker_entity::todo::{CreateTodo, TodoFilter, TodoTree};

use crate::output::{self, OutputFormat};

/// Arguments for `add`
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Todo title
    pub title: String,

    /// Description
    #[arg(short = 'd', long = "desc")]
    pub description: Option<String>,

    /// Due date (YYYY-MM-DD or "YYYY-MM-DD HH:MM")
    #[arg(long)]
    pub due: Option<String>,

    /// Priority (1-10)
    #[arg(short, long, default_value = "5")]
    pub priority: i32,

    /// Category name (created if it does not exist)
    #[arg(short, long)]
    pub category: Option<String>,

    /// Comma-separated tag names (created if they do not exist)
    #[arg(short, long)]
    pub tags: Option<String>,

    /// Parent todo ID for subtasks
    #[arg(long)]
    pub parent: Option<Uuid>,
}

/// Arguments for `list`
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Show completed todos too
    #[arg(short, long)]
    pub all: bool,

    /// Filter by category name
    #[arg(short, long)]
    pub category: Option<String>,

    /// Minimum priority
    #[arg(long)]
    pub priority_min: Option<i32>,

    /// Show todos due today
    #[arg(long)]
    pub today: bool,
}

/// Arguments for `show`
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Todo ID (or unique prefix)
    pub id: String,
}

/// Arguments for `done`
#[derive(Debug, Args)]
pub struct DoneArgs {
    /// Todo ID (or unique prefix)
    pub id: String,
}

/// Arguments for `delete`
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Todo ID (or unique prefix)
    pub id: String,

    /// Skip confirmation
    #[arg(short, long)]
    pub force: bool,
}

/// Todo display row
#[derive(Debug, Serialize, Tabled)]
struct TodoRow {
    /// Todo ID (short form)
    id: String,
    /// Priority
    pri: i32,
    /// Title
    title: String,
    /// Due date
    due: String,
    /// Category
    category: String,
    /// Tags
    tags: String,
}

/// Add a new todo.
pub async fn add(args: &AddArgs, config_path: &str) -> Result<(), AppError> {
    let state = super::build_state(config_path).await?;

    let category_id = match &args.category {
        Some(name) => Some(resolve_category(&state, name).await?),
        None => None,
    };

    let tag_ids = match &args.tags {
        Some(spec) => resolve_tags(&state, spec).await?,
        None => Vec::new(),
    };

    let due_date = args.due.as_deref().map(parse_due).transpose()?;

    let data = CreateTodo {
        title: args.title.clone(),
        description: args.description.clone(),
        due_date,
        priority: args.priority,
        parent_id: args.parent,
        category_id,
        tag_ids,
    };

    let todo = match args.parent {
        Some(parent_id) => state.todo_service.add_subtask(parent_id, data).await?,
        None => state.todo_service.create(data).await?,
    };

    output::print_success(&format!(
        "Created: {} (id: {})",
        todo.todo.title, todo.todo.id
    ));
    Ok(())
}

/// List todos in a table, subtasks indented under their parents.
pub async fn list(args: &ListArgs, config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let state = super::build_state(config_path).await?;

    let category_id = match &args.category {
        Some(name) => Some(find_category(&state, name).await?),
        None => None,
    };

    let (due_after, due_before) = if args.today {
        let start = Utc.from_utc_datetime(&Utc::now().date_naive().and_time(NaiveTime::MIN));
        let end = start + chrono::Duration::days(1) - chrono::Duration::seconds(1);
        (Some(start), Some(end))
    } else {
        (None, None)
    };

    let filter = TodoFilter {
        category_id,
        completed: if args.all { None } else { Some(false) },
        priority_min: args.priority_min,
        due_before,
        due_after,
        ..TodoFilter::default()
    };

    let page = state
        .todo_service
        .list(&filter, &PageRequest::new(1, 100))
        .await?;

    let mut rows = Vec::new();
    for tree in &page.items {
        rows.push(row_for(tree, 0));
        for subtask in &tree.subtasks {
            rows.push(row_for(subtask, 1));
        }
    }

    if format == OutputFormat::Table {
        println!("Todos ({} total)", page.total_items);
    }
    output::print_list(&rows, format);
    Ok(())
}

/// Show a single todo with its full subtree.
pub async fn show(args: &ShowArgs, config_path: &str) -> Result<(), AppError> {
    let state = super::build_state(config_path).await?;
    let id = resolve_id(&state, &args.id).await?;
    let tree = state.todo_service.get(id).await?;

    output::print_kv("ID", &tree.todo.id.to_string());
    output::print_kv("Title", &tree.todo.title);
    if let Some(description) = &tree.todo.description {
        output::print_kv("Description", description);
    }
    output::print_kv("Priority", &tree.todo.priority.to_string());
    output::print_kv(
        "Status",
        if tree.todo.completed { "done" } else { "pending" },
    );
    if let Some(due) = tree.todo.due_date {
        output::print_kv("Due", &due.format("%Y-%m-%d %H:%M").to_string());
    }
    if let Some(category) = &tree.category {
        output::print_kv("Category", &category.name);
    }
    if !tree.tags.is_empty() {
        let names: Vec<&str> = tree.tags.iter().map(|t| t.name.as_str()).collect();
        output::print_kv("Tags", &names.join(", "));
    }
    if !tree.attachments.is_empty() {
        output::print_kv("Attachments", &tree.attachments.len().to_string());
    }

    if !tree.subtasks.is_empty() {
        println!("  Subtasks:");
        print_subtasks(&tree.subtasks, 2);
    }
    Ok(())
}

/// Mark a todo as complete.
pub async fn done(args: &DoneArgs, config_path: &str) -> Result<(), AppError> {
    let state = super::build_state(config_path).await?;
    let id = resolve_id(&state, &args.id).await?;
    let tree = state.todo_service.mark_complete(id).await?;

    output::print_success(&format!("Completed: {}", tree.todo.title));
    Ok(())
}

/// Delete a todo (and its subtasks) after confirmation.
pub async fn delete(args: &DeleteArgs, config_path: &str) -> Result<(), AppError> {
    let state = super::build_state(config_path).await?;
    let id = resolve_id(&state, &args.id).await?;
    let tree = state.todo_service.get(id).await?;

    if !args.force {
        let confirm = dialoguer::Confirm::new()
            .with_prompt(format!("Delete '{}'?", tree.todo.title))
            .default(false)
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {e}")))?;
        if !confirm {
            println!("Cancelled.");
            return Ok(());
        }
    }

    state.todo_service.delete(id).await?;
    output::print_success(&format!("Deleted: {}", tree.todo.title));
    Ok(())
}

fn row_for(tree: &TodoTree, indent: usize) -> TodoRow {
    let mut title = if indent > 0 {
        format!("{}+-- {}", "  ".repeat(indent), tree.todo.title)
    } else {
        tree.todo.title.clone()
    };
    if tree.todo.completed {
        title = format!("{title} [done]");
    }

    TodoRow {
        id: tree.todo.id.to_string()[..8].to_string(),
        pri: tree.todo.priority,
        title,
        due: tree
            .todo
            .due_date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default(),
        category: tree
            .category
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_default(),
        tags: tree
            .tags
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn print_subtasks(subtasks: &[TodoTree], indent: usize) {
    // Bounded by the configured max depth, but keep the walk iterative.
    let mut stack: Vec<(&TodoTree, usize)> =
        subtasks.iter().rev().map(|s| (s, indent)).collect();
    while let Some((node, level)) = stack.pop() {
        let marker = if node.todo.completed { "[x]" } else { "[ ]" };
        println!(
            "{}{} {} ({})",
            " ".repeat(level * 2),
            marker,
            node.todo.title,
            &node.todo.id.to_string()[..8]
        );
        for child in node.subtasks.iter().rev() {
            stack.push((child, level + 1));
        }
    }
}

/// Parse a due date in `YYYY-MM-DD` or `YYYY-MM-DD HH:MM` form.
fn parse_due(raw: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M") {
        return Ok(Utc.from_utc_datetime(&datetime));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        && let Some(datetime) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(Utc.from_utc_datetime(&datetime));
    }
    Err(AppError::validation(format!(
        "Invalid date format '{raw}': use YYYY-MM-DD or YYYY-MM-DD HH:MM"
    )))
}

/// Resolve a category by name, creating it when absent.
async fn resolve_category(state: &AppState, name: &str) -> Result<Uuid, AppError> {
    for category in state.category_service.get_all().await? {
        if category.name.eq_ignore_ascii_case(name) {
            return Ok(category.id);
        }
    }
    let created = state
        .category_service
        .create(CreateCategory {
            name: name.to_string(),
            color: None,
            icon: None,
        })
        .await?;
    Ok(created.id)
}

/// Find a category by name without creating it.
async fn find_category(state: &AppState, name: &str) -> Result<Uuid, AppError> {
    state
        .category_service
        .get_all()
        .await?
        .into_iter()
        .find(|c| c.name.eq_ignore_ascii_case(name))
        .map(|c| c.id)
        .ok_or_else(|| AppError::not_found(format!("Category not found: {name}")))
}

/// Resolve comma-separated tag names, creating missing ones.
async fn resolve_tags(state: &AppState, spec: &str) -> Result<Vec<Uuid>, AppError> {
    let existing = state.tag_service.get_all().await?;

    let mut ids = Vec::new();
    for raw in spec.split(',') {
        let name = raw.trim();
        if name.is_empty() {
            continue;
        }

        if let Some(tag) = existing.iter().find(|t| t.name.eq_ignore_ascii_case(name)) {
            ids.push(tag.id);
        } else {
            let created = state
                .tag_service
                .create(CreateTag {
                    name: name.to_string(),
                    color: None,
                })
                .await?;
            ids.push(created.id);
        }
    }
    Ok(ids)
}

/// Resolve a full or unique-prefix todo ID across the listed trees.
async fn resolve_id(state: &AppState, prefix: &str) -> Result<Uuid, AppError> {
    if let Ok(id) = Uuid::parse_str(prefix) {
        return Ok(id);
    }

    let page = state
        .todo_service
        .list(&TodoFilter::default(), &PageRequest::new(1, 100))
        .await?;

    let mut matches = Vec::new();
    let mut stack: Vec<&TodoTree> = page.items.iter().collect();
    while let Some(node) = stack.pop() {
        if node.todo.id.to_string().starts_with(prefix) {
            matches.push(node.todo.id);
        }
        stack.extend(node.subtasks.iter());
    }

    match matches.as_slice() {
        [] => Err(AppError::not_found(format!("Todo not found: {prefix}"))),
        [id] => Ok(*id),
        _ => Err(AppError::validation(format!(
            "Ambiguous todo ID prefix: {prefix}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_due_date_only() {
        let parsed = parse_due("2026-08-06").unwrap();
        assert_eq!(parsed.format("%Y-%m-%d %H:%M").to_string(), "2026-08-06 00:00");
    }

    #[test]
    fn test_parse_due_with_time() {
        let parsed = parse_due("2026-08-06 14:30").unwrap();
        assert_eq!(parsed.format("%Y-%m-%d %H:%M").to_string(), "2026-08-06 14:30");
    }

    #[test]
    fn test_parse_due_rejects_garbage() {
        assert!(parse_due("tomorrow").is_err());
    }
}
