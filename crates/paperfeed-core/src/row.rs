//! Loosely-typed storage rows.

use std::collections::HashMap;

/// One stored column value, as the store hands it over.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Null       => "null",
            Scalar::Integer(_) => "integer",
            Scalar::Real(_)    => "real",
            Scalar::Text(_)    => "text",
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Integer(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Real(v)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Scalar::Null)
    }
}

static NULL: Scalar = Scalar::Null;

/// Column access by name. An absent column reads the same as `NULL`.
pub trait RowAccessor {
    fn get(&self, column: &str) -> Option<&Scalar>;

    /// The value with absent columns folded into `Scalar::Null`.
    fn scalar(&self, column: &str) -> &Scalar {
        self.get(column).unwrap_or(&NULL)
    }
}

/// An in-memory row keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    values: HashMap<String, Scalar>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: impl Into<Scalar>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: &str, value: impl Into<Scalar>) {
        self.values.insert(column.to_string(), value.into());
    }

    pub fn remove(&mut self, column: &str) -> Option<Scalar> {
        self.values.remove(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl RowAccessor for RawRow {
    fn get(&self, column: &str) -> Option<&Scalar> {
        self.values.get(column)
    }
}

impl RowAccessor for HashMap<String, Scalar> {
    fn get(&self, column: &str) -> Option<&Scalar> {
        HashMap::get(self, column)
    }
}

impl FromIterator<(String, Scalar)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (String, Scalar)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}
