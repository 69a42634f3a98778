//! Todo CRUD handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use todotracker_core::error::AppError;
use todotracker_entity::todo::TodoTree;

use crate::dto::request::{CreateTodoRequest, TodoFilterParams, UpdateTodoRequest};
use crate::dto::response::{ApiResponse, PaginatedResponse};
use crate::extractors::PaginationParams;
use crate::state::AppState;

/// GET /api/todos
pub async fn list_todos(
    State(state): State<AppState>,
    Query(filter): Query<TodoFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<TodoTree>>>, AppError> {
    let page = state
        .todo_service
        .list(&filter.into(), &pagination.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page.into())))
}

/// POST /api/todos
pub async fn create_todo(
    State(state): State<AppState>,
    Json(req): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TodoTree>>), AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let todo = state.todo_service.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(todo))))
}

/// GET /api/todos/{id}
pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TodoTree>>, AppError> {
    let todo = state.todo_service.get(id).await?;
    Ok(Json(ApiResponse::ok(todo)))
}

/// PUT/PATCH /api/todos/{id}
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTodoRequest>,
) -> Result<Json<ApiResponse<TodoTree>>, AppError> {
    let todo = state.todo_service.update(id, req.into()).await?;
    Ok(Json(ApiResponse::ok(todo)))
}

/// DELETE /api/todos/{id}
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.todo_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/todos/{id}/complete
pub async fn complete_todo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TodoTree>>, AppError> {
    let todo = state.todo_service.mark_complete(id).await?;
    Ok(Json(ApiResponse::ok(todo)))
}

/// POST /api/todos/{id}/subtasks
pub async fn create_subtask(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TodoTree>>), AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let subtask = state.todo_service.add_subtask(id, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(subtask))))
}
