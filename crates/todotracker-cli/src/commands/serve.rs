//! Start the ToDoTracker API server.

use std::sync::Arc;

use clap::Args;

use todotracker_core::error::AppError;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, config_path: &str) -> Result<(), AppError> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }

    let config = Arc::new(config);

    let pool = todotracker_database::DatabasePool::connect(&config.database)
        .await?
        .into_pool();
    todotracker_database::migration::run_migrations(&pool).await?;

    let state = todotracker_api::AppState::build(Arc::clone(&config), pool).await?;
    state.priority_service.seed_defaults().await?;
    state.attachment_service.sweep_orphans().await?;

    todotracker_api::run_server(state).await
}
