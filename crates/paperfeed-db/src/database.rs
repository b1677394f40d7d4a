//! Database handle.
//!
//! The store is written by an upstream pipeline and only ever read here, so
//! every connection is opened read-only and lives for one operation.

use crate::error::{DbError, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main database handle.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Open an existing database file. A missing file is an error rather
    /// than an empty database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(DbError::NotFound(path.display().to_string()));
        }

        let db = Self { path };
        // Fail now on a file SQLite cannot read.
        db.connect()?;
        debug!("Opened database at {}", db.path.display());
        Ok(db)
    }

    /// A fresh read-only connection.
    pub fn connect(&self) -> Result<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Ok(Connection::open_with_flags(&self.path, flags)?)
    }

    /// Get the database path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
