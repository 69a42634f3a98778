//! Priority level repository implementation.

use sqlx::PgPool;

use todotracker_core::error::{AppError, ErrorKind};
use todotracker_core::result::AppResult;
use todotracker_entity::priority::PriorityLevel;

/// Repository for the ten fixed priority levels.
#[derive(Debug, Clone)]
pub struct PriorityRepository {
    pool: PgPool,
}

impl PriorityRepository {
    /// Create a new priority repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all priority levels ordered by level.
    pub async fn find_all(&self) -> AppResult<Vec<PriorityLevel>> {
        sqlx::query_as::<_, PriorityLevel>("SELECT * FROM priority_levels ORDER BY level ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list priorities", e))
    }

    /// Update a priority level's name and/or color.
    pub async fn update(
        &self,
        level: i32,
        name: Option<&str>,
        color: Option<&str>,
    ) -> AppResult<Option<PriorityLevel>> {
        sqlx::query_as::<_, PriorityLevel>(
            "UPDATE priority_levels SET \
                name = COALESCE($2, name), \
                color = COALESCE($3, color) \
             WHERE level = $1 RETURNING *",
        )
        .bind(level)
        .bind(name)
        .bind(color)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update priority", e))
    }

    /// Insert the default levels for any level not already present.
    /// Returns the number of rows inserted.
    pub async fn seed_defaults(&self) -> AppResult<u64> {
        let mut inserted = 0;
        for level in PriorityLevel::defaults() {
            let result = sqlx::query(
                "INSERT INTO priority_levels (level, name, color) VALUES ($1, $2, $3) \
                 ON CONFLICT (level) DO NOTHING",
            )
            .bind(level.level)
            .bind(&level.name)
            .bind(&level.color)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to seed priorities", e)
            })?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }
}
