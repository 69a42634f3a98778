//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use todotracker_cache::SnapshotCache;
use todotracker_core::config::AppConfig;
use todotracker_core::result::AppResult;
use todotracker_database::repositories::attachment::AttachmentRepository;
use todotracker_database::repositories::category::CategoryRepository;
use todotracker_database::repositories::priority::PriorityRepository;
use todotracker_database::repositories::tag::TagRepository;
use todotracker_database::repositories::todo::TodoRepository;
use todotracker_service::{
    AttachmentService, CategoryService, PriorityService, TagService, TodoService,
};
use todotracker_storage::AttachmentStore;

use crate::middleware::rate_limit::RateLimiter;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// Todo service.
    pub todo_service: Arc<TodoService>,
    /// Category service.
    pub category_service: Arc<CategoryService>,
    /// Tag service.
    pub tag_service: Arc<TagService>,
    /// Priority service (cached reference data).
    pub priority_service: Arc<PriorityService>,
    /// Attachment ingestion service.
    pub attachment_service: Arc<AttachmentService>,
    /// Rate limiter for the default endpoint class.
    pub default_limiter: Arc<RateLimiter>,
    /// Rate limiter for the upload endpoint class.
    pub upload_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Wire repositories, storage, cache, and services onto an existing
    /// pool. Migrations are the caller's responsibility.
    pub async fn build(config: Arc<AppConfig>, db_pool: PgPool) -> AppResult<Self> {
        let store = Arc::new(AttachmentStore::new(&config.storage.attachments_dir).await?);

        let todo_repo = Arc::new(TodoRepository::new(db_pool.clone()));
        let category_repo = Arc::new(CategoryRepository::new(db_pool.clone()));
        let tag_repo = Arc::new(TagRepository::new(db_pool.clone()));
        let priority_repo = Arc::new(PriorityRepository::new(db_pool.clone()));
        let attachment_repo = Arc::new(AttachmentRepository::new(db_pool.clone()));

        let priority_cache = Arc::new(SnapshotCache::new(Duration::from_secs(
            config.cache.priority_ttl_seconds,
        )));

        let todo_service = Arc::new(TodoService::new(
            Arc::clone(&todo_repo),
            Arc::clone(&category_repo),
            Arc::clone(&tag_repo),
            Arc::clone(&attachment_repo),
            Arc::clone(&store),
            config.todo.clone(),
        ));
        let category_service = Arc::new(CategoryService::new(Arc::clone(&category_repo)));
        let tag_service = Arc::new(TagService::new(Arc::clone(&tag_repo)));
        let priority_service = Arc::new(PriorityService::new(
            Arc::clone(&priority_repo),
            Arc::clone(&priority_cache),
        ));
        let attachment_service = Arc::new(AttachmentService::new(
            Arc::clone(&attachment_repo),
            Arc::clone(&todo_repo),
            Arc::clone(&store),
            config.storage.clone(),
        ));

        let default_limiter = Arc::new(RateLimiter::per_minute(
            config.rate_limit.default_per_minute,
        ));
        let upload_limiter = Arc::new(RateLimiter::per_minute(config.rate_limit.upload_per_minute));

        Ok(Self {
            config,
            db_pool,
            todo_service,
            category_service,
            tag_service,
            priority_service,
            attachment_service,
            default_limiter,
            upload_limiter,
        })
    }
}
