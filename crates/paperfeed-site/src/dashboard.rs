//! Processing exported papers JSON and turning it into a dashboard page.
//!
//! Input documents look like `{date, total_papers, papers: [...]}` where each
//! paper is a loose JSON object. Papers go through the same text pipeline as
//! the database path, via [`RecordAssembler::process_paper_value`].

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use paperfeed_common::{FeedError, Result};
use paperfeed_core::payload::render_document;
use paperfeed_core::RecordAssembler;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::builder::read_template;
use crate::output::write_atomic;

/// A processed papers document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedDocument {
    pub date: Value,
    pub total_papers: usize,
    pub original_total: Value,
    pub papers: Vec<Value>,
    pub processed_at: String,
}

/// An entry worth keeping when minimal entries are skipped.
fn is_complete(paper: &Value) -> bool {
    paper.as_object().is_some_and(|o| o.len() > 1)
}

/// Process every paper in `input`.
///
/// With `skip_minimal`, entries that are not objects with more than one key
/// are dropped.
pub fn process_document(
    input: &Value,
    assembler: &RecordAssembler,
    skip_minimal: bool,
    processed_at: DateTime<Utc>,
) -> Result<ProcessedDocument> {
    let papers = input
        .get("papers")
        .ok_or_else(|| FeedError::Other(anyhow::anyhow!("No 'papers' field found in JSON")))?
        .as_array()
        .ok_or_else(|| FeedError::Other(anyhow::anyhow!("'papers' field is not an array")))?;

    info!("Processing {} papers...", papers.len());
    let processed: Vec<Value> = papers
        .iter()
        .filter(|p| !skip_minimal || is_complete(p))
        .map(|p| assembler.process_paper_value(p))
        .collect();
    debug!(kept = processed.len(), dropped = papers.len() - processed.len(), "Processed papers");

    Ok(ProcessedDocument {
        date: input.get("date").cloned().unwrap_or(Value::Null),
        total_papers: processed.len(),
        original_total: input.get("total_papers").cloned().unwrap_or(Value::Null),
        papers: processed,
        processed_at: processed_at.to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}

fn read_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Read `input`, process it, write pretty JSON to `output`.
pub fn process_file(
    input: &Path,
    output: &Path,
    assembler: &RecordAssembler,
    skip_minimal: bool,
) -> Result<ProcessedDocument> {
    info!("Loading papers from {}", input.display());
    let document = process_document(&read_document(input)?, assembler, skip_minimal, Utc::now())?;

    let json = serde_json::to_string_pretty(&document)?;
    write_atomic(output, json.as_bytes())?;
    info!(
        "Saved {} processed papers to {} (input had {})",
        document.total_papers,
        output.display(),
        document.original_total
    );
    Ok(document)
}

/// Read `input`, process every paper, embed the result in `template`.
pub fn generate_dashboard(
    input: &Path,
    template: &Path,
    output: &Path,
    assembler: &RecordAssembler,
) -> Result<ProcessedDocument> {
    let template = read_template(template)?;
    info!("Loading papers data from {}", input.display());
    let document = process_document(&read_document(input)?, assembler, false, Utc::now())?;

    let html = render_document(&template, &document)?;
    write_atomic(output, html.as_bytes())?;
    info!("Generated {} with {} papers", output.display(), document.papers.len());
    Ok(document)
}
