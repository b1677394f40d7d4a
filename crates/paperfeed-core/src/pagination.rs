//! Request validation and the paginated envelope.

use chrono::NaiveDate;
use paperfeed_common::{FeedError, Result};
use serde::{Deserialize, Serialize};

use crate::record::PaperRecord;

/// Parse a `YYYY-MM-DD` request date.
pub fn validate_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| FeedError::InvalidDate(raw.to_string()))
}

/// A validated `(page, limit)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// `page >= 1` and `1 <= limit <= max_limit`.
    pub fn validate(page: i64, limit: i64, max_limit: i64) -> Result<Self> {
        if page < 1 {
            return Err(FeedError::InvalidPage(page));
        }
        if limit < 1 || limit > max_limit {
            return Err(FeedError::InvalidLimit { limit, max: max_limit });
        }
        Ok(Self { page, limit })
    }
}

/// Where a validated request lands within `total_papers` results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub limit: i64,
    pub total_papers: i64,
    pub total_pages: i64,
    pub offset: i64,
}

impl PageWindow {
    /// Zero results is an empty window for any page; otherwise a page past
    /// the last one is an error.
    pub fn compute(total_papers: i64, request: PageRequest) -> Result<Self> {
        let PageRequest { page, limit } = request;
        if total_papers == 0 {
            return Ok(Self { page, limit, total_papers: 0, total_pages: 0, offset: 0 });
        }

        let total_pages = (total_papers + limit - 1) / limit;
        if page > total_pages {
            return Err(FeedError::PageOutOfBounds { page, total_pages });
        }
        Ok(Self {
            page,
            limit,
            total_papers,
            total_pages,
            offset: (page - 1) * limit,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.total_papers == 0
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.total_papers > 0 && self.page > 1
    }

    pub fn into_page(self, papers: Vec<PaperRecord>) -> PaperPage {
        PaperPage {
            papers,
            page: self.page,
            limit: self.limit,
            total_papers: self.total_papers,
            total_pages: self.total_pages,
            has_next: self.has_next(),
            has_prev: self.has_prev(),
        }
    }
}

/// The paginated API envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperPage {
    pub papers: Vec<PaperRecord>,
    pub page: i64,
    pub limit: i64,
    pub total_papers: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}
