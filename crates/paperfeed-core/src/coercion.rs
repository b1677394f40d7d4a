//! Field coercion: stored scalars into typed record fields.
//!
//! Every function here is total. Malformed input degrades to the documented
//! default and leaves a `warn` line behind; nothing in this module fails a
//! record except [`coerce_text`], whose caller decides what a type mismatch
//! means.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use paperfeed_common::FeedError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::row::Scalar;

/// Characters of a malformed value kept in the warning.
const PREVIEW_CHARS: usize = 50;

/// A numeric value passed through with its stored kind intact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Numeric::Int(i) => i as f64,
            Numeric::Float(f) => f,
        }
    }
}

/// A column held a value of a kind the record cannot carry.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("column {column} expected {expected}, found {found}")]
pub struct UnexpectedType {
    pub column: String,
    pub expected: &'static str,
    pub found: &'static str,
}

fn preview(raw: &str) -> String {
    let mut out: String = raw.chars().take(PREVIEW_CHARS).collect();
    if raw.chars().count() > PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}

fn warn_malformed(column: &str, raw: &str) {
    let err = FeedError::MalformedStoredJson {
        column: column.to_string(),
        preview: preview(raw),
    };
    warn!(column, "{}", err);
}

/// Decode a JSON-array column. Empty, null, undecodable or non-array input
/// yields an empty sequence.
pub fn parse_list_field(raw: &Scalar, column: &str) -> Vec<Value> {
    let text = match raw {
        Scalar::Null => return Vec::new(),
        Scalar::Text(s) if s.is_empty() => return Vec::new(),
        Scalar::Text(s) => s,
        Scalar::Integer(_) | Scalar::Real(_) => {
            warn_malformed(column, &scalar_display(raw));
            return Vec::new();
        }
    };

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => items,
        Ok(Value::Null) => Vec::new(),
        Ok(_) | Err(_) => {
            warn_malformed(column, text);
            Vec::new()
        }
    }
}

fn date_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").unwrap())
}

const OFFSET_FORMATS: [&str; 2] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

fn parse_iso(raw: &str) -> Option<NaiveDate> {
    // A trailing `Z` is the UTC offset.
    let normalised = raw.replace('Z', "+00:00");
    let s = normalised.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.date_naive());
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Normalise a stored date to `YYYY-MM-DD`.
///
/// ISO-8601 first; then the first `YYYY-MM-DD` substring; otherwise the
/// input unchanged.
pub fn parse_date(raw: &str) -> String {
    if let Some(date) = parse_iso(raw) {
        return date.format("%Y-%m-%d").to_string();
    }
    if let Some(m) = date_pattern().captures(raw).and_then(|c| c.get(1)) {
        return m.as_str().to_string();
    }
    warn!("{}", FeedError::UnparseableDate(raw.to_string()));
    raw.to_string()
}

/// Pass a stored number through verbatim, `default` for null.
///
/// Numeric text is parsed; any other text falls back to `default`.
pub fn coerce_number(raw: &Scalar, default: Numeric, column: &str) -> Numeric {
    match raw {
        Scalar::Null => default,
        Scalar::Integer(i) => Numeric::Int(*i),
        Scalar::Real(f) => Numeric::Float(*f),
        Scalar::Text(s) => parse_numeric(s).unwrap_or_else(|| {
            warn!(column, value = %preview(s), "non-numeric value in numeric column, using default");
            default
        }),
    }
}

fn parse_numeric(s: &str) -> Option<Numeric> {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(Numeric::Int(i));
    }
    s.parse::<f64>().ok().filter(|f| f.is_finite()).map(Numeric::Float)
}

/// Floating-point column, integers widened.
pub fn coerce_f64(raw: &Scalar, default: f64, column: &str) -> f64 {
    coerce_number(raw, Numeric::Float(default), column).as_f64()
}

/// Integer column. Reals are truncated.
pub fn coerce_i64(raw: &Scalar, default: i64, column: &str) -> i64 {
    match coerce_number(raw, Numeric::Int(default), column) {
        Numeric::Int(i) => i,
        Numeric::Float(f) if f.is_finite() => {
            if f.fract() != 0.0 {
                warn!(column, value = f, "fractional value in integer column, truncating");
            }
            f as i64
        }
        Numeric::Float(_) => default,
    }
}

/// Nullable numeric column: null stays null.
pub fn optional_number(raw: &Scalar, column: &str) -> Option<Numeric> {
    match raw {
        Scalar::Null => None,
        Scalar::Integer(i) => Some(Numeric::Int(*i)),
        Scalar::Real(f) => Some(Numeric::Float(*f)),
        Scalar::Text(s) => {
            let parsed = parse_numeric(s);
            if parsed.is_none() {
                warn!(column, value = %preview(s), "non-numeric value in numeric column, using null");
            }
            parsed
        }
    }
}

/// Text column: null stays null, numbers are a type mismatch.
pub fn coerce_text(raw: &Scalar, column: &str) -> Result<Option<String>, UnexpectedType> {
    match raw {
        Scalar::Null => Ok(None),
        Scalar::Text(s) => Ok(Some(s.clone())),
        other => Err(UnexpectedType {
            column: column.to_string(),
            expected: "text",
            found: other.type_name(),
        }),
    }
}

/// Stored date column, normalised when non-empty.
pub fn coerce_date(raw: &Scalar, column: &str) -> Result<Option<String>, UnexpectedType> {
    Ok(coerce_text(raw, column)?.map(|s| if s.is_empty() { s } else { parse_date(&s) }))
}

fn scalar_display(raw: &Scalar) -> String {
    match raw {
        Scalar::Null => "null".to_string(),
        Scalar::Integer(i) => i.to_string(),
        Scalar::Real(f) => f.to_string(),
        Scalar::Text(s) => s.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_list_field_valid_array() {
        let raw = Scalar::from(r#"["Alice", "Bob"]"#);
        assert_eq!(parse_list_field(&raw, "authors"), vec![json!("Alice"), json!("Bob")]);
    }

    #[test]
    fn test_parse_list_field_empty_and_null() {
        assert!(parse_list_field(&Scalar::Null, "authors").is_empty());
        assert!(parse_list_field(&Scalar::from(""), "authors").is_empty());
        assert!(parse_list_field(&Scalar::from("null"), "authors").is_empty());
    }

    #[test]
    fn test_parse_list_field_malformed_is_empty() {
        assert!(parse_list_field(&Scalar::from("[\"unterminated"), "authors").is_empty());
        assert!(parse_list_field(&Scalar::from("{\"not\": \"a list\"}"), "categories").is_empty());
        assert!(parse_list_field(&Scalar::Integer(3), "author_h_indexes").is_empty());
    }

    #[test]
    fn test_parse_date_iso_with_z() {
        assert_eq!(parse_date("2025-07-15T00:00:00Z"), "2025-07-15");
    }

    #[test]
    fn test_parse_date_variants() {
        assert_eq!(parse_date("2025-07-15"), "2025-07-15");
        assert_eq!(parse_date("2025-07-15T13:45:10.123456"), "2025-07-15");
        assert_eq!(parse_date("2025-07-15 08:00:00"), "2025-07-15");
        assert_eq!(parse_date("2025-07-15T23:30:00+05:00"), "2025-07-15");
    }

    #[test]
    fn test_parse_date_regex_fallback() {
        assert_eq!(parse_date("published 2025-07-15 (v2)"), "2025-07-15");
    }

    #[test]
    fn test_parse_date_unparseable_passes_through() {
        assert_eq!(parse_date("bad-date"), "bad-date");
        assert_eq!(parse_date(""), "");
    }

    #[test]
    fn test_coerce_number_passes_kind_through() {
        assert_eq!(coerce_number(&Scalar::Integer(4), Numeric::Float(0.0), "x"), Numeric::Int(4));
        assert_eq!(coerce_number(&Scalar::Real(0.25), Numeric::Int(0), "x"), Numeric::Float(0.25));
        assert_eq!(coerce_number(&Scalar::Null, Numeric::Float(0.0), "x"), Numeric::Float(0.0));
        assert_eq!(coerce_number(&Scalar::from("12"), Numeric::Int(0), "x"), Numeric::Int(12));
        assert_eq!(coerce_number(&Scalar::from("n/a"), Numeric::Int(0), "x"), Numeric::Int(0));
    }

    #[test]
    fn test_typed_helpers() {
        assert_eq!(coerce_f64(&Scalar::Null, 0.0, "rlhf_score"), 0.0);
        assert_eq!(coerce_f64(&Scalar::Integer(3), 0.0, "rlhf_score"), 3.0);
        assert_eq!(coerce_i64(&Scalar::Null, 0, "total_authors"), 0);
        assert_eq!(coerce_i64(&Scalar::Real(5.0), 0, "total_authors"), 5);
        assert_eq!(optional_number(&Scalar::Null, "novelty_score"), None);
        assert_eq!(optional_number(&Scalar::Real(8.5), "novelty_score"), Some(Numeric::Float(8.5)));
    }

    #[test]
    fn test_coerce_text_rejects_numbers() {
        assert_eq!(coerce_text(&Scalar::Null, "title"), Ok(None));
        assert_eq!(coerce_text(&Scalar::from("x"), "title"), Ok(Some("x".to_string())));
        let err = coerce_text(&Scalar::Integer(1), "title").unwrap_err();
        assert_eq!(err.found, "integer");
    }

    #[test]
    fn test_coerce_date_keeps_empty() {
        assert_eq!(coerce_date(&Scalar::from(""), "published_date"), Ok(Some(String::new())));
        assert_eq!(
            coerce_date(&Scalar::from("2025-07-15T00:00:00Z"), "published_date"),
            Ok(Some("2025-07-15".to_string()))
        );
    }

    #[test]
    fn test_numeric_serde_keeps_kind() {
        assert_eq!(serde_json::to_string(&Numeric::Int(7)).unwrap(), "7");
        assert_eq!(serde_json::to_string(&Numeric::Float(7.0)).unwrap(), "7.0");
        let back: Numeric = serde_json::from_str("7.0").unwrap();
        assert_eq!(back, Numeric::Float(7.0));
    }
}
