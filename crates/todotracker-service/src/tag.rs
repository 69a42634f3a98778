//! Tag CRUD service.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use todotracker_core::error::AppError;
use todotracker_core::result::AppResult;
use todotracker_database::repositories::tag::TagRepository;
use todotracker_entity::tag::{CreateTag, Tag};

use crate::color::validate_color;

/// Service for tag operations.
#[derive(Debug, Clone)]
pub struct TagService {
    /// Tag repository.
    repo: Arc<TagRepository>,
}

impl TagService {
    /// Creates a new tag service.
    pub fn new(repo: Arc<TagRepository>) -> Self {
        Self { repo }
    }

    /// Lists all tags ordered by name.
    pub async fn get_all(&self) -> AppResult<Vec<Tag>> {
        self.repo.find_all().await
    }

    /// Gets a tag by ID.
    pub async fn get(&self, id: Uuid) -> AppResult<Tag> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Tag not found"))
    }

    /// Creates a new tag.
    pub async fn create(&self, data: CreateTag) -> AppResult<Tag> {
        if data.name.trim().is_empty() {
            return Err(AppError::validation("Tag name cannot be empty"));
        }
        if let Some(color) = &data.color {
            validate_color(color)?;
        }

        let tag = self.repo.create(&data).await?;
        info!(tag_id = %tag.id, name = %tag.name, "Tag created");
        Ok(tag)
    }

    /// Updates a tag. Only the provided fields change.
    pub async fn update(&self, id: Uuid, name: Option<&str>, color: Option<&str>) -> AppResult<Tag> {
        if let Some(name) = name
            && name.trim().is_empty()
        {
            return Err(AppError::validation("Tag name cannot be empty"));
        }
        if let Some(color) = color {
            validate_color(color)?;
        }

        self.repo
            .update(id, name, color)
            .await?
            .ok_or_else(|| AppError::not_found("Tag not found"))
    }

    /// Deletes a tag, removing its todo associations only.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.repo.delete(id).await? {
            return Err(AppError::not_found("Tag not found"));
        }
        info!(tag_id = %id, "Tag deleted");
        Ok(())
    }
}
