//! CLI command definitions and dispatch.

pub mod migrate;
pub mod reference;
pub mod serve;
pub mod todo;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use todotracker_api::AppState;
use todotracker_core::config::AppConfig;
use todotracker_core::error::AppError;

use crate::output::OutputFormat;

/// ToDoTracker — spend less time setting up, more time doing.
#[derive(Debug, Parser)]
#[command(name = "todotracker", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve(serve::ServeArgs),
    /// Run database migrations
    Migrate,
    /// Add a new todo
    Add(todo::AddArgs),
    /// List todos
    List(todo::ListArgs),
    /// Show a todo with its subtasks
    Show(todo::ShowArgs),
    /// Mark a todo as complete
    Done(todo::DoneArgs),
    /// Delete a todo and its subtasks
    Delete(todo::DeleteArgs),
    /// List all categories
    Categories,
    /// List all tags
    Tags,
    /// List priority levels
    Priorities,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.config).await,
            Commands::Migrate => migrate::execute(&self.config).await,
            Commands::Add(args) => todo::add(args, &self.config).await,
            Commands::List(args) => todo::list(args, &self.config, self.format).await,
            Commands::Show(args) => todo::show(args, &self.config).await,
            Commands::Done(args) => todo::done(args, &self.config).await,
            Commands::Delete(args) => todo::delete(args, &self.config).await,
            Commands::Categories => reference::categories(&self.config, self.format).await,
            Commands::Tags => reference::tags(&self.config, self.format).await,
            Commands::Priorities => reference::priorities(&self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_from(config_path)
}

/// Helper: connect, migrate, wire services, and seed reference data —
/// the CLI works against the database directly.
pub async fn build_state(config_path: &str) -> Result<AppState, AppError> {
    let config = Arc::new(load_config(config_path)?);

    let pool = todotracker_database::DatabasePool::connect(&config.database)
        .await?
        .into_pool();
    todotracker_database::migration::run_migrations(&pool).await?;

    let state = AppState::build(config, pool).await?;
    state.priority_service.seed_defaults().await?;

    Ok(state)
}
