//! paperfeed-web: JSON API and static page server for the paper feed.
//! Provides:
//!   - Paginated papers for a publication date
//!   - Paper counts per date
//!   - The pre-built static pages

pub mod handlers;
pub mod router;
pub mod state;
