//! Tag CRUD handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use todotracker_core::error::AppError;
use todotracker_entity::tag::{CreateTag, Tag};

use crate::dto::request::{CreateTagRequest, UpdateTagRequest};
use crate::dto::response::ApiResponse;
use crate::state::AppState;

/// GET /api/tags
pub async fn list_tags(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Tag>>>, AppError> {
    let tags = state.tag_service.get_all().await?;
    Ok(Json(ApiResponse::ok(tags)))
}

/// POST /api/tags
pub async fn create_tag(
    State(state): State<AppState>,
    Json(req): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Tag>>), AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let tag = state
        .tag_service
        .create(CreateTag {
            name: req.name,
            color: req.color,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(tag))))
}

/// GET /api/tags/{id}
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Tag>>, AppError> {
    let tag = state.tag_service.get(id).await?;
    Ok(Json(ApiResponse::ok(tag)))
}

/// PUT/PATCH /api/tags/{id}
pub async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTagRequest>,
) -> Result<Json<ApiResponse<Tag>>, AppError> {
    let tag = state
        .tag_service
        .update(id, req.name.as_deref(), req.color.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(tag)))
}

/// DELETE /api/tags/{id}
pub async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.tag_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
