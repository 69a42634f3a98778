//! ToDoTracker Server — task-tracking REST API.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use todotracker_core::config::AppConfig;
use todotracker_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("TODOTRACKER_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting ToDoTracker v{}", env!("CARGO_PKG_VERSION"));
    let config = Arc::new(config);

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db_pool = todotracker_database::DatabasePool::connect(&config.database)
        .await?
        .into_pool();

    todotracker_database::migration::run_migrations(&db_pool).await?;

    // ── Step 2: Wire repositories, storage, cache, services ──────
    let state = todotracker_api::AppState::build(Arc::clone(&config), db_pool).await?;

    // ── Step 3: Seed reference data ──────────────────────────────
    state.priority_service.seed_defaults().await?;

    // ── Step 4: Reclaim files left behind by aborted uploads ─────
    state.attachment_service.sweep_orphans().await?;

    // ── Step 5: Serve ────────────────────────────────────────────
    todotracker_api::run_server(state).await
}
