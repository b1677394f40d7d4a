use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Every failure the feed can name.
///
/// `MalformedStoredJson` and `UnparseableDate` are recovered where they occur
/// (logged, then degraded to a default); they exist as variants so the log
/// line and the tests share one wording.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Malformed stored JSON in column {column}: {preview}")]
    MalformedStoredJson { column: String, preview: String },

    #[error("Unparseable date: {0}")]
    UnparseableDate(String),

    #[error("Placeholder {0} not found in template")]
    MissingPlaceholder(String),

    #[error("Placeholder {token} occurs {count} times in template, expected exactly once")]
    DuplicatePlaceholder { token: String, count: usize },

    #[error("Failed to assemble paper {id}: {reason}")]
    RecordAssembly { id: String, reason: String },

    #[error("Invalid date format: {0}. Use YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Page must be >= 1, got {0}")]
    InvalidPage(i64),

    #[error("Limit must be between 1 and {max}, got {limit}")]
    InvalidLimit { limit: i64, max: i64 },

    #[error("Page {page} is out of bounds. Total pages: {total_pages}")]
    PageOutOfBounds { page: i64, total_pages: i64 },

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, FeedError>;

/// Errors surfaced to HTTP clients as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl From<FeedError> for ApiError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::InvalidDate(_) => {
                ApiError::BadRequest("Invalid date format. Use YYYY-MM-DD".to_string())
            }
            FeedError::InvalidPage(_) => ApiError::BadRequest("Page must be >= 1".to_string()),
            FeedError::InvalidLimit { max, .. } => {
                ApiError::BadRequest(format!("Limit must be between 1 and {}", max))
            }
            FeedError::PageOutOfBounds { .. } => ApiError::BadRequest(err.to_string()),
            FeedError::Database(msg) => {
                tracing::error!("Database query error: {}", msg);
                ApiError::Internal("Database query failed".to_string())
            }
            other => {
                tracing::error!("Unhandled feed error: {}", other);
                ApiError::Internal("Internal server error".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_map_to_bad_request() {
        let err: ApiError = FeedError::InvalidPage(0).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Page must be >= 1");

        let err: ApiError = FeedError::InvalidLimit { limit: 101, max: 100 }.into();
        assert_eq!(err.to_string(), "Limit must be between 1 and 100");
    }

    #[test]
    fn test_out_of_bounds_message_names_total_pages() {
        let err: ApiError = FeedError::PageOutOfBounds { page: 4, total_pages: 3 }.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Page 4 is out of bounds. Total pages: 3");
    }

    #[test]
    fn test_database_errors_hide_details() {
        let err: ApiError = FeedError::Database("no such table: papers".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Database query failed");
    }

    #[tokio::test]
    async fn test_api_error_body_shape() {
        let response = ApiError::NotFound("Endpoint not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Endpoint not found" }));
    }
}
