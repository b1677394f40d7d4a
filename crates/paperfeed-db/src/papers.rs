//! Paper repository.
//!
//! Read-side queries over the `papers` table. Every date filter compares
//! `DATE(published_date)`, and rows come back ordered by id.

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::row::StoredRow;
use paperfeed_core::columns::{select_list, TABLE_PAPERS};
use rusqlite::params;
use std::sync::Arc;
use tracing::debug;

/// Repository for paper queries.
#[derive(Debug, Clone)]
pub struct PaperRepository {
    db: Arc<Database>,
}

impl PaperRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Number of papers published on `date`.
    pub fn count_for_date(&self, date: &str) -> Result<u64> {
        let conn = self.db.connect()?;
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE DATE(published_date) = ?1",
            TABLE_PAPERS
        );
        let count: i64 = conn.query_row(&sql, params![date], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// One page of papers for `date`.
    pub fn page_for_date(&self, date: &str, limit: u64, offset: u64) -> Result<Vec<StoredRow>> {
        let limit = to_sql_int(limit, "limit")?;
        let offset = to_sql_int(offset, "offset")?;
        self.query_date(date, limit, offset)
    }

    /// Every paper for `date`, or the first `max_papers` of them.
    pub fn all_for_date(&self, date: &str, max_papers: Option<usize>) -> Result<Vec<StoredRow>> {
        // A negative LIMIT is no limit in SQLite.
        let limit = match max_papers {
            Some(n) => to_sql_int(n as u64, "max_papers")?,
            None => -1,
        };
        self.query_date(date, limit, 0)
    }

    fn query_date(&self, date: &str, limit: i64, offset: i64) -> Result<Vec<StoredRow>> {
        let conn = self.db.connect()?;
        let sql = format!(
            "SELECT {} FROM {} WHERE DATE(published_date) = ?1 ORDER BY id LIMIT ?2 OFFSET ?3",
            select_list(),
            TABLE_PAPERS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![date, limit, offset], StoredRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(date, limit, offset, rows = rows.len(), "Loaded papers");
        Ok(rows)
    }

    /// Every publication date present, newest first.
    pub fn distinct_dates(&self) -> Result<Vec<String>> {
        let conn = self.db.connect()?;
        let sql = format!(
            "SELECT DISTINCT DATE(published_date) AS date FROM {} \
             WHERE published_date IS NOT NULL ORDER BY date DESC",
            TABLE_PAPERS
        );
        let mut stmt = conn.prepare(&sql)?;
        let dates = stmt
            .query_map([], |row| row.get::<_, Option<String>>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        // DATE() yields NULL for values it cannot read.
        Ok(dates.into_iter().flatten().collect())
    }
}

fn to_sql_int(value: u64, name: &str) -> Result<i64> {
    i64::try_from(value).map_err(|_| DbError::InvalidQuery(format!("{} out of range: {}", name, value)))
}
