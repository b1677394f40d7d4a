//! paperfeed-site: offline page generation.
//!
//! - [`builder`]: per-date static pages straight from the database
//! - [`dashboard`]: processing exported papers JSON, and a dashboard page
//!   built from it

pub mod builder;
pub mod dashboard;
pub mod output;

pub use builder::{BuildOptions, BuildReport, SiteBuilder};
pub use dashboard::{generate_dashboard, process_document, process_file, ProcessedDocument};
