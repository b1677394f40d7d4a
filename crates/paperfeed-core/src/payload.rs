//! Embedding a serialized payload into an HTML template.
//!
//! The payload is compact JSON with the few sequences that could end a
//! `<script>` element or an HTML comment rewritten as JSON string escapes.
//! The result is still valid JSON and decodes to the same value.

use chrono::NaiveDate;
use paperfeed_common::{FeedError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::record::PaperRecord;

/// Marks where the payload goes. Must appear exactly once.
pub const DATA_PLACEHOLDER: &str = "<!--DATA_HERE-->";
pub const TITLE_PLACEHOLDER: &str = "PLACEHOLDER_TITLE";
pub const MOBILE_TITLE_PLACEHOLDER: &str = "PLACEHOLDER_MOBILE_TITLE";
pub const DESKTOP_TITLE_PLACEHOLDER: &str = "PLACEHOLDER_DESKTOP_TITLE";

/// The document embedded in a per-date page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePayload {
    pub date: String,
    pub total_papers: usize,
    pub papers: Vec<PaperRecord>,
}

impl PagePayload {
    pub fn new(date: impl Into<String>, papers: Vec<PaperRecord>) -> Self {
        Self {
            date: date.into(),
            total_papers: papers.len(),
            papers,
        }
    }
}

/// Compact JSON that is inert inside a `<script>` element.
pub fn to_script_safe_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(script_safe(&json))
}

// `<` and `>` only occur inside JSON strings, so every rewrite lands in a
// string literal and uses an escape JSON already defines.
fn script_safe(json: &str) -> String {
    json.replace("<!--", "\\u003c!--")
        .replace("-->", "--\\u003e")
        .replace("</", "<\\/")
}

/// `2025-07-15` -> `15 July 2025`. Unparseable input is returned as is.
pub fn format_date_for_title(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format("%d %B %Y").to_string(),
        Err(_) => {
            warn!(date, "could not format date for title, using it verbatim");
            date.to_string()
        }
    }
}

/// Substitute `json` for the single [`DATA_PLACEHOLDER`] in `template`.
pub fn embed_payload(template: &str, json: &str) -> Result<String> {
    match template.matches(DATA_PLACEHOLDER).count() {
        0 => Err(FeedError::MissingPlaceholder(DATA_PLACEHOLDER.to_string())),
        1 => Ok(template.replacen(DATA_PLACEHOLDER, json, 1)),
        count => Err(FeedError::DuplicatePlaceholder {
            token: DATA_PLACEHOLDER.to_string(),
            count,
        }),
    }
}

/// Serialize `value` script-safely and embed it.
pub fn render_document<T: Serialize + ?Sized>(template: &str, value: &T) -> Result<String> {
    embed_payload(template, &to_script_safe_json(value)?)
}

/// Fill a per-date page: titles first, then the payload.
///
/// A missing title placeholder is only worth a warning; a missing or repeated
/// payload placeholder fails the render.
pub fn render_page(template: &str, payload: &PagePayload) -> Result<String> {
    let human_date = format_date_for_title(&payload.date);
    let heading = format!("Papers Published on {}", human_date);

    let mut html = template.to_string();
    for (token, value) in [
        (TITLE_PLACEHOLDER, human_date.as_str()),
        (MOBILE_TITLE_PLACEHOLDER, heading.as_str()),
        (DESKTOP_TITLE_PLACEHOLDER, heading.as_str()),
    ] {
        if html.contains(token) {
            html = html.replace(token, value);
        } else {
            warn!(token, "title placeholder not found in template");
        }
    }

    let rendered = render_document(&html, payload)?;
    debug!(date = %payload.date, papers = payload.total_papers, bytes = rendered.len(), "rendered page");
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_script_safe_json_neutralises_closers() {
        let out = to_script_safe_json(&json!({"t": "a</script><!-- b -->"})).unwrap();
        assert!(!out.contains("</script>"));
        assert!(!out.contains("<!--"));
        assert!(!out.contains("-->"));
        let back: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(back["t"], "a</script><!-- b -->");
    }

    #[test]
    fn test_format_date_for_title() {
        assert_eq!(format_date_for_title("2025-07-15"), "15 July 2025");
        assert_eq!(format_date_for_title("2025-07-05"), "05 July 2025");
        assert_eq!(format_date_for_title("soon"), "soon");
    }

    #[test]
    fn test_embed_payload_exactly_once() {
        assert_eq!(
            embed_payload("<script>const d = <!--DATA_HERE-->;</script>", "{}").unwrap(),
            "<script>const d = {};</script>"
        );
    }

    #[test]
    fn test_embed_payload_missing_placeholder() {
        let err = embed_payload("<html></html>", "{}").unwrap_err();
        assert!(matches!(err, FeedError::MissingPlaceholder(_)));
    }

    #[test]
    fn test_embed_payload_duplicate_placeholder() {
        let err = embed_payload("<!--DATA_HERE--><!--DATA_HERE-->", "{}").unwrap_err();
        assert!(matches!(err, FeedError::DuplicatePlaceholder { count: 2, .. }));
    }

    #[test]
    fn test_render_page_fills_titles_and_payload() {
        let template = "<title>PLACEHOLDER_TITLE</title><h1>PLACEHOLDER_MOBILE_TITLE</h1>\
                        <h2>PLACEHOLDER_DESKTOP_TITLE</h2><script>x=<!--DATA_HERE--></script>";
        let html = render_page(template, &PagePayload::new("2025-07-15", vec![])).unwrap();
        assert_eq!(
            html,
            "<title>15 July 2025</title><h1>Papers Published on 15 July 2025</h1>\
             <h2>Papers Published on 15 July 2025</h2>\
             <script>x={\"date\":\"2025-07-15\",\"total_papers\":0,\"papers\":[]}</script>"
        );
    }
}
