//! Database error types.

use paperfeed_common::FeedError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database file not found: {0}")]
    NotFound(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl From<DbError> for FeedError {
    fn from(err: DbError) -> Self {
        FeedError::Database(err.to_string())
    }
}
