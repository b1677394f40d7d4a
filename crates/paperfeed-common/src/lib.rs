//! paperfeed-common: shared error types used across all Paperfeed crates.

pub mod error;

pub use error::{ApiError, FeedError, Result};
