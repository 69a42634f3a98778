//! Category repository implementation.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use todotracker_core::error::{AppError, ErrorKind};
use todotracker_core::result::AppResult;
use todotracker_entity::category::{Category, CreateCategory};

/// Repository for category CRUD.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    /// Create a new category repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all categories ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list categories", e))
    }

    /// Find a category by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find category", e))
    }

    /// Find categories by a set of IDs (batch load for tree assembly).
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Category>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load categories", e))
    }

    /// Create a new category.
    pub async fn create(&self, data: &CreateCategory) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, color, icon) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.color)
        .bind(&data.icon)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("categories_name_key") =>
            {
                AppError::conflict(format!("Category '{}' already exists", data.name))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create category", e),
        })
    }

    /// Update a category. Only non-`None` fields change.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        color: Option<&str>,
        icon: Option<&str>,
    ) -> AppResult<Option<Category>> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET \
                name = COALESCE($2, name), \
                color = COALESCE($3, color), \
                icon = COALESCE($4, icon) \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(color)
        .bind(icon)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("categories_name_key") =>
            {
                AppError::conflict("Another category already uses that name")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to update category", e),
        })
    }

    /// Delete a category. Referencing todos keep existing with a null
    /// category (FK is ON DELETE SET NULL).
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete category", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether a category row exists (transaction-scoped).
    pub async fn exists(conn: &mut PgConnection, id: Uuid) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check category", e))
    }
}
