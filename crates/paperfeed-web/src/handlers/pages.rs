//! Index page, favicon fallback and the JSON 404.

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
};
use tracing::warn;

use paperfeed_common::ApiError;

use crate::state::SharedState;

pub const NOT_FOUND: &str = "Endpoint not found";
const FAVICON: &str = "favicon.png";

/// GET / - The configured landing page from the static directory
pub async fn index(State(state): State<SharedState>) -> Result<Html<String>, ApiError> {
    let path = state.server.static_dir.join(&state.server.index_page);
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            warn!("Index page {} unavailable: {}", path.display(), e);
            Err(ApiError::NotFound(NOT_FOUND.to_string()))
        }
    }
}

/// GET /favicon.ico - Browsers ask for an ICO; the site ships a PNG
pub async fn favicon_ico(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let path = state.server.static_dir.join(FAVICON);
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, "image/png")], bytes)),
        Err(e) => {
            warn!("Favicon {} unavailable: {}", path.display(), e);
            Err(ApiError::NotFound(NOT_FOUND.to_string()))
        }
    }
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound(NOT_FOUND.to_string())
}
