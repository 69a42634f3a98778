//! Priority level service with a read-through snapshot cache.
//!
//! Priority levels are static data (10 rows, rarely changed) so reads go
//! through an in-memory snapshot. Every write invalidates the snapshot so
//! subsequent reads are fresh regardless of remaining TTL.

use std::sync::Arc;

use tracing::info;

use todotracker_cache::SnapshotCache;
use todotracker_core::error::AppError;
use todotracker_core::result::AppResult;
use todotracker_database::repositories::priority::PriorityRepository;
use todotracker_entity::priority::PriorityLevel;

use crate::color::validate_color;

/// Service for priority level operations.
#[derive(Debug, Clone)]
pub struct PriorityService {
    /// Priority repository.
    repo: Arc<PriorityRepository>,
    /// Snapshot cache of all ten levels.
    cache: Arc<SnapshotCache<Vec<PriorityLevel>>>,
}

impl PriorityService {
    /// Creates a new priority service.
    pub fn new(
        repo: Arc<PriorityRepository>,
        cache: Arc<SnapshotCache<Vec<PriorityLevel>>>,
    ) -> Self {
        Self { repo, cache }
    }

    /// Lists all priority levels, served from the cache when valid.
    pub async fn get_all(&self) -> AppResult<Vec<PriorityLevel>> {
        self.cache
            .get_or_fetch(|| async { self.repo.find_all().await })
            .await
    }

    /// Gets a priority level by its number (served from the cache).
    pub async fn get_by_level(&self, level: i32) -> AppResult<PriorityLevel> {
        self.get_all()
            .await?
            .into_iter()
            .find(|p| p.level == level)
            .ok_or_else(|| AppError::not_found("Priority level not found"))
    }

    /// Updates a priority level's name and/or color, then invalidates the
    /// cache so the next read is fresh.
    pub async fn update(
        &self,
        level: i32,
        name: Option<&str>,
        color: Option<&str>,
    ) -> AppResult<PriorityLevel> {
        if !(1..=10).contains(&level) {
            return Err(AppError::validation(
                "Priority level must be between 1 and 10",
            ));
        }
        if let Some(name) = name
            && name.trim().is_empty()
        {
            return Err(AppError::validation("Priority name cannot be empty"));
        }
        if let Some(color) = color {
            validate_color(color)?;
        }

        let priority = self
            .repo
            .update(level, name, color)
            .await?
            .ok_or_else(|| AppError::not_found("Priority level not found"))?;

        self.cache.invalidate().await;

        info!(level, "Priority level updated");
        Ok(priority)
    }

    /// Seeds the default levels when the table is empty. Bypasses the
    /// cache entirely and invalidates it afterwards.
    pub async fn seed_defaults(&self) -> AppResult<()> {
        let inserted = self.repo.seed_defaults().await?;
        if inserted > 0 {
            info!(inserted, "Seeded default priority levels");
            self.cache.invalidate().await;
        }
        Ok(())
    }
}
