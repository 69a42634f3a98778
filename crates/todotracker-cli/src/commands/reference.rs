//! Reference-data listing commands: categories, tags, priorities.

use serde::Serialize;
use tabled::Tabled;

use todotracker_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Category display row
#[derive(Debug, Serialize, Tabled)]
struct CategoryRow {
    /// Category ID (short form)
    id: String,
    /// Name
    name: String,
    /// Color
    color: String,
    /// Icon
    icon: String,
}

/// Tag display row
#[derive(Debug, Serialize, Tabled)]
struct TagRow {
    /// Tag ID (short form)
    id: String,
    /// Name
    name: String,
    /// Color
    color: String,
}

/// Priority display row
#[derive(Debug, Serialize, Tabled)]
struct PriorityRow {
    /// Level number
    level: i32,
    /// Name
    name: String,
    /// Color
    color: String,
}

/// List all categories.
pub async fn categories(config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let state = super::build_state(config_path).await?;

    let rows: Vec<CategoryRow> = state
        .category_service
        .get_all()
        .await?
        .iter()
        .map(|c| CategoryRow {
            id: c.id.to_string()[..8].to_string(),
            name: c.name.clone(),
            color: c.color.clone().unwrap_or_default(),
            icon: c.icon.clone().unwrap_or_default(),
        })
        .collect();

    output::print_list(&rows, format);
    Ok(())
}

/// List all tags.
pub async fn tags(config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let state = super::build_state(config_path).await?;

    let rows: Vec<TagRow> = state
        .tag_service
        .get_all()
        .await?
        .iter()
        .map(|t| TagRow {
            id: t.id.to_string()[..8].to_string(),
            name: t.name.clone(),
            color: t.color.clone().unwrap_or_default(),
        })
        .collect();

    output::print_list(&rows, format);
    Ok(())
}

/// List the ten priority levels.
pub async fn priorities(config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let state = super::build_state(config_path).await?;

    let rows: Vec<PriorityRow> = state
        .priority_service
        .get_all()
        .await?
        .iter()
        .map(|p| PriorityRow {
            level: p.level,
            name: p.name.clone(),
            color: p.color.clone().unwrap_or_default(),
        })
        .collect();

    output::print_list(&rows, format);
    Ok(())
}
