//! Paperfeed Database Layer
//!
//! Read-only access to the SQLite `papers` table populated by the upstream
//! scraping and scoring pipeline.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use paperfeed_db::{Database, PaperRepository};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::open("cache.db")?;
//!     let papers = PaperRepository::new(Arc::new(db));
//!     println!("{} papers", papers.count_for_date("2025-07-15")?);
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;
pub mod papers;
pub mod row;

pub use database::Database;
pub use error::{DbError, Result};
pub use papers::PaperRepository;
pub use row::StoredRow;
