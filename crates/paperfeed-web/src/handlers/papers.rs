//! Paper feed endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use paperfeed_common::{ApiError, FeedError};
use paperfeed_core::{validate_date, FailurePolicy, PageRequest, PageWindow, PaperPage};

use crate::state::{AppState, SharedState};

const DATE_REQUIRED: &str = "Date parameter is required (YYYY-MM-DD format)";

/// Raw query string. Numbers stay as text so a non-integer falls back to the
/// default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PapersQuery {
    pub date: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PaperCount {
    pub total_papers: u64,
}

fn require_date(date: Option<&str>) -> Result<String, ApiError> {
    let date = date
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::BadRequest(DATE_REQUIRED.to_string()))?;
    validate_date(date)?;
    Ok(date.to_string())
}

fn int_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

/// Run a blocking store query off the async runtime.
async fn blocking<T, F>(state: SharedState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> paperfeed_common::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(state.as_ref()))
        .await
        .map_err(|e| {
            error!("Query task failed: {}", e);
            ApiError::Internal("Internal server error".to_string())
        })?
        .map_err(ApiError::from)
}

/// GET /api/papers/count - Number of papers published on a date
pub async fn api_papers_count(
    State(state): State<SharedState>,
    Query(query): Query<PapersQuery>,
) -> Result<Json<PaperCount>, ApiError> {
    let date = require_date(query.date.as_deref())?;
    let total_papers = blocking(state, move |s| Ok(s.papers.count_for_date(&date)?)).await?;
    Ok(Json(PaperCount { total_papers }))
}

/// GET /api/papers - One page of papers for a date
pub async fn api_papers(
    State(state): State<SharedState>,
    Query(query): Query<PapersQuery>,
) -> Result<Json<PaperPage>, ApiError> {
    let date = require_date(query.date.as_deref())?;
    let request = PageRequest::validate(
        int_or(query.page.as_deref(), 1),
        int_or(query.limit.as_deref(), state.server.default_limit),
        state.server.max_limit,
    )?;

    let page = blocking(state, move |s| load_page(s, &date, request)).await?;
    Ok(Json(page))
}

fn load_page(state: &AppState, date: &str, request: PageRequest) -> Result<PaperPage, FeedError> {
    let total = state.papers.count_for_date(date)?;
    let window = PageWindow::compute(total as i64, request)?;
    if window.is_empty() {
        return Ok(window.into_page(Vec::new()));
    }

    let rows = state
        .papers
        .page_for_date(date, window.limit as u64, window.offset as u64)?;
    let papers = state.assembler.assemble_all(&rows, FailurePolicy::SkipAndLog)?;
    debug!(date, page = window.page, served = papers.len(), "Serving papers");
    Ok(window.into_page(papers))
}
