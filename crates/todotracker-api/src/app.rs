//! Application builder — wires router + middleware + state into an Axum
//! app and runs the server.

use std::net::SocketAddr;

use axum::Router;
use tower_http::trace::TraceLayer;

use todotracker_core::error::AppError;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors_config = state.config.server.cors.clone();

    let mut app = build_router(state);
    if cors_config.enabled {
        app = app.layer(build_cors_layer(&cors_config));
    }

    app.layer(TraceLayer::new_for_http())
}

/// Runs the ToDoTracker API server until the process is terminated.
pub async fn run_server(state: AppState) -> Result<(), AppError> {
    let addr = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    );

    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(%addr, "ToDoTracker API listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))
}
