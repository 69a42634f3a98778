//! Priority level handlers.

use axum::Json;
use axum::extract::{Path, State};
use todotracker_core::error::AppError;
use todotracker_entity::priority::PriorityLevel;

use crate::dto::request::UpdatePriorityRequest;
use crate::dto::response::ApiResponse;
use crate::state::AppState;

/// GET /api/priorities
pub async fn list_priorities(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PriorityLevel>>>, AppError> {
    let priorities = state.priority_service.get_all().await?;
    Ok(Json(ApiResponse::ok(priorities)))
}

/// PUT /api/priorities/{level}
pub async fn update_priority(
    State(state): State<AppState>,
    Path(level): Path<i32>,
    Json(req): Json<UpdatePriorityRequest>,
) -> Result<Json<ApiResponse<PriorityLevel>>, AppError> {
    let priority = state
        .priority_service
        .update(level, req.name.as_deref(), req.color.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(priority)))
}
