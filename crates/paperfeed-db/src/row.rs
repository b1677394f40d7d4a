//! Materialised SQLite rows.

use std::collections::HashMap;

use paperfeed_core::{RowAccessor, Scalar};
use rusqlite::types::ValueRef;
use rusqlite::Row;

/// One result row, owned and addressable by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredRow {
    values: HashMap<String, Scalar>,
}

impl StoredRow {
    /// Copy every column of `row` out of the statement.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let stmt = row.as_ref();
        let mut values = HashMap::with_capacity(stmt.column_count());
        for (i, name) in stmt.column_names().into_iter().enumerate() {
            values.insert(name.to_string(), to_scalar(row.get_ref(i)?));
        }
        Ok(Self { values })
    }
}

fn to_scalar(value: ValueRef<'_>) -> Scalar {
    match value {
        ValueRef::Null => Scalar::Null,
        ValueRef::Integer(i) => Scalar::Integer(i),
        ValueRef::Real(f) => Scalar::Real(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Scalar::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

impl RowAccessor for StoredRow {
    fn get(&self, column: &str) -> Option<&Scalar> {
        self.values.get(column)
    }
}
