//! Database migration command.

use todotracker_core::error::AppError;

use crate::output;

/// Run all pending migrations.
pub async fn execute(config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;

    let pool = todotracker_database::DatabasePool::connect(&config.database)
        .await?
        .into_pool();

    println!("Running database migrations...");
    todotracker_database::migration::run_migrations(&pool).await?;
    output::print_success("All migrations applied successfully.");

    Ok(())
}
