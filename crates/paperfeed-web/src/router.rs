//! Axum router. Maps all URL paths to handlers.

use axum::{handler::HandlerWithoutStateExt, routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use std::sync::Arc;
use crate::state::{AppState, SharedState};
use crate::handlers::{
    pages::{favicon_ico, index, not_found},
    papers::{api_papers, api_papers_count},
};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    // Anything that is neither an API route nor a file is a JSON 404.
    let static_files = ServeDir::new(&state.server.static_dir)
        .not_found_service(not_found.into_service());
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Pages
        .route("/", get(index))
        .route("/favicon.ico", get(favicon_ico))

        // API endpoints
        .route("/api/papers",       get(api_papers))
        .route("/api/papers/count", get(api_papers_count))

        // Static files
        .fallback_service(static_files)

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
