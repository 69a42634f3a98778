//! Category CRUD handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use todotracker_core::error::AppError;
use todotracker_entity::category::{Category, CreateCategory};

use crate::dto::request::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::dto::response::ApiResponse;
use crate::state::AppState;

/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Category>>>, AppError> {
    let categories = state.category_service.get_all().await?;
    Ok(Json(ApiResponse::ok(categories)))
}

/// POST /api/categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>), AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let category = state
        .category_service
        .create(CreateCategory {
            name: req.name,
            color: req.color,
            icon: req.icon,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(category))))
}

/// GET /api/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Category>>, AppError> {
    let category = state.category_service.get(id).await?;
    Ok(Json(ApiResponse::ok(category)))
}

/// PUT/PATCH /api/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCategoryRequest>,
) -> Result<Json<ApiResponse<Category>>, AppError> {
    let category = state
        .category_service
        .update(id, req.name.as_deref(), req.color.as_deref(), req.icon.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(category)))
}

/// DELETE /api/categories/{id}
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.category_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
