//! Category CRUD service.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use todotracker_core::error::AppError;
use todotracker_core::result::AppResult;
use todotracker_database::repositories::category::CategoryRepository;
use todotracker_entity::category::{Category, CreateCategory};

use crate::color::validate_color;

/// Service for category operations.
#[derive(Debug, Clone)]
pub struct CategoryService {
    /// Category repository.
    repo: Arc<CategoryRepository>,
}

impl CategoryService {
    /// Creates a new category service.
    pub fn new(repo: Arc<CategoryRepository>) -> Self {
        Self { repo }
    }

    /// Lists all categories ordered by name.
    pub async fn get_all(&self) -> AppResult<Vec<Category>> {
        self.repo.find_all().await
    }

    /// Gets a category by ID.
    pub async fn get(&self, id: Uuid) -> AppResult<Category> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Category not found"))
    }

    /// Creates a new category.
    pub async fn create(&self, data: CreateCategory) -> AppResult<Category> {
        if data.name.trim().is_empty() {
            return Err(AppError::validation("Category name cannot be empty"));
        }
        if let Some(color) = &data.color {
            validate_color(color)?;
        }

        let category = self.repo.create(&data).await?;
        info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    /// Updates a category. Only the provided fields change.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        color: Option<&str>,
        icon: Option<&str>,
    ) -> AppResult<Category> {
        if let Some(name) = name
            && name.trim().is_empty()
        {
            return Err(AppError::validation("Category name cannot be empty"));
        }
        if let Some(color) = color {
            validate_color(color)?;
        }

        self.repo
            .update(id, name, color, icon)
            .await?
            .ok_or_else(|| AppError::not_found("Category not found"))
    }

    /// Deletes a category. Todos referencing it keep existing with a null
    /// category.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.repo.delete(id).await? {
            return Err(AppError::not_found("Category not found"));
        }
        info!(category_id = %id, "Category deleted");
        Ok(())
    }
}
