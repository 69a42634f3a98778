//! Route definitions for the ToDoTracker HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`. The
//! router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Headroom above the upload cap so the service-level size check owns the
/// rejection message instead of the raw body limit.
const BODY_LIMIT_MARGIN: usize = 64 * 1024;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.storage.max_upload_size_bytes as usize + BODY_LIMIT_MARGIN;

    // Everything except the multipart upload shares the default rate
    // limit class.
    let default_class = Router::new()
        .merge(todo_routes())
        .merge(category_routes())
        .merge(tag_routes())
        .merge(priority_routes())
        .route(
            "/attachments/{id}",
            get(handlers::attachment::download_attachment),
        )
        .route(
            "/attachments/{id}",
            delete(handlers::attachment::delete_attachment),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::default_rate_limit,
        ));

    let upload_class = Router::new().route(
        "/todos/{id}/attachments",
        post(handlers::attachment::upload_attachment).layer(
            axum_middleware::from_fn_with_state(
                state.clone(),
                middleware::rate_limit::upload_rate_limit,
            ),
        ),
    );

    let api = default_class
        .merge(upload_class)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_api_key,
        ));

    Router::new()
        .nest("/api", api)
        .route("/health", get(handlers::health::health_check))
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(state)
}

/// Todo CRUD, completion, subtasks
fn todo_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(handlers::todo::list_todos))
        .route("/todos", post(handlers::todo::create_todo))
        .route("/todos/{id}", get(handlers::todo::get_todo))
        .route("/todos/{id}", put(handlers::todo::update_todo))
        .route("/todos/{id}", axum::routing::patch(handlers::todo::update_todo))
        .route("/todos/{id}", delete(handlers::todo::delete_todo))
        .route("/todos/{id}/complete", post(handlers::todo::complete_todo))
        .route("/todos/{id}/subtasks", post(handlers::todo::create_subtask))
}

/// Category CRUD
fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(handlers::category::list_categories))
        .route("/categories", post(handlers::category::create_category))
        .route("/categories/{id}", get(handlers::category::get_category))
        .route("/categories/{id}", put(handlers::category::update_category))
        .route(
            "/categories/{id}",
            axum::routing::patch(handlers::category::update_category),
        )
        .route(
            "/categories/{id}",
            delete(handlers::category::delete_category),
        )
}

/// Tag CRUD
fn tag_routes() -> Router<AppState> {
    Router::new()
        .route("/tags", get(handlers::tag::list_tags))
        .route("/tags", post(handlers::tag::create_tag))
        .route("/tags/{id}", get(handlers::tag::get_tag))
        .route("/tags/{id}", put(handlers::tag::update_tag))
        .route("/tags/{id}", axum::routing::patch(handlers::tag::update_tag))
        .route("/tags/{id}", delete(handlers::tag::delete_tag))
}

/// Priority reference data
fn priority_routes() -> Router<AppState> {
    Router::new()
        .route("/priorities", get(handlers::priority::list_priorities))
        .route(
            "/priorities/{level}",
            put(handlers::priority::update_priority),
        )
}
