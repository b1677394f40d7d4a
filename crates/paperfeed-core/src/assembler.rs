//! Record assembly: one stored row in, one [`PaperRecord`] out.

use paperfeed_common::{FeedError, Result};
use serde_json::{Map, Value};
use tracing::{error, warn};

use crate::coercion::{
    coerce_date, coerce_f64, coerce_i64, coerce_text, optional_number, parse_list_field,
    UnexpectedType,
};
use crate::columns::Topic;
use crate::record::{AuthorHIndex, PaperRecord};
use crate::row::{RowAccessor, Scalar};
use crate::text::TextPipeline;

/// What a batch does when one record cannot be assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure and leave the paper out. Live serving.
    SkipAndLog,
    /// Fail the whole batch. Static builds.
    Abort,
}

/// Text fields processed when present in an exported paper object.
const EXPORT_TEXT_FIELDS: [&str; 12] = [
    "title",
    "abstract",
    "introduction_text",
    "summary",
    "novelty_justification",
    "impact_justification",
    "recommendation_justification",
    "rlhf_justification",
    "weak_supervision_justification",
    "diffusion_reasoning_justification",
    "distributed_training_justification",
    "datasets_justification",
];

#[derive(Debug, Clone, Default)]
pub struct RecordAssembler {
    pipeline: TextPipeline,
}

impl RecordAssembler {
    pub fn new(pipeline: TextPipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &TextPipeline {
        &self.pipeline
    }

    /// Build the record for one row.
    ///
    /// Fails only when the row has no usable `id` or a text column holds a
    /// number; every other defect degrades to a default.
    pub fn assemble<R: RowAccessor + ?Sized>(&self, row: &R) -> Result<PaperRecord> {
        let id = read_id(row.scalar("id"))?;
        self.build(row, id).map_err(|e| FeedError::RecordAssembly {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }

    fn build<R: RowAccessor + ?Sized>(&self, row: &R, id: i64) -> std::result::Result<PaperRecord, UnexpectedType> {
        let text = |column: &str| -> std::result::Result<Option<String>, UnexpectedType> {
            Ok(coerce_text(row.scalar(column), column)?.map(|s| self.pipeline.process_text_field(&s)))
        };
        let plain = |column: &str| coerce_text(row.scalar(column), column);
        let score = |topic: Topic| {
            let column = topic.score_column();
            coerce_f64(row.scalar(&column), 0.0, &column)
        };
        let relevance = |topic: Topic| {
            let column = topic.relevance_column();
            coerce_text(row.scalar(&column), &column)
        };
        let justification = |topic: Topic| text(&topic.justification_column());

        Ok(PaperRecord {
            id,
            title: text("title")?,
            authors: self.string_list(row.scalar("authors"), "authors"),
            categories: self.string_list(row.scalar("categories"), "categories"),
            abstract_text: text("abstract")?,
            published_date: coerce_date(row.scalar("published_date"), "published_date")?,
            arxiv_url: plain("arxiv_url")?,
            pdf_url: plain("pdf_url")?,
            scraper_status: plain("scraper_status")?,
            intro_status: plain("intro_status")?,
            embedding_status: plain("embedding_status")?,

            rlhf_score: score(Topic::Rlhf),
            weak_supervision_score: score(Topic::WeakSupervision),
            diffusion_reasoning_score: score(Topic::DiffusionReasoning),
            distributed_training_score: score(Topic::DistributedTraining),
            datasets_score: score(Topic::Datasets),
            llm_validation_status: plain("llm_validation_status")?,
            rlhf_relevance: relevance(Topic::Rlhf)?,
            weak_supervision_relevance: relevance(Topic::WeakSupervision)?,
            diffusion_reasoning_relevance: relevance(Topic::DiffusionReasoning)?,
            distributed_training_relevance: relevance(Topic::DistributedTraining)?,
            datasets_relevance: relevance(Topic::Datasets)?,
            rlhf_justification: justification(Topic::Rlhf)?,
            weak_supervision_justification: justification(Topic::WeakSupervision)?,
            diffusion_reasoning_justification: justification(Topic::DiffusionReasoning)?,
            distributed_training_justification: justification(Topic::DistributedTraining)?,
            datasets_justification: justification(Topic::Datasets)?,
            llm_score_status: plain("llm_score_status")?,

            summary: text("summary")?,
            novelty_score: optional_number(row.scalar("novelty_score"), "novelty_score"),
            novelty_justification: text("novelty_justification")?,
            impact_score: optional_number(row.scalar("impact_score"), "impact_score"),
            impact_justification: text("impact_justification")?,
            recommendation_score: optional_number(row.scalar("recommendation_score"), "recommendation_score"),
            recommendation_justification: text("recommendation_justification")?,

            h_index_status: plain("h_index_status")?,
            semantic_scholar_url: plain("semantic_scholar_url")?,
            total_authors: coerce_i64(row.scalar("total_authors"), 0, "total_authors"),
            authors_found: coerce_i64(row.scalar("authors_found"), 0, "authors_found"),
            highest_h_index: coerce_i64(row.scalar("highest_h_index"), 0, "highest_h_index"),
            average_h_index: coerce_f64(row.scalar("average_h_index"), 0.0, "average_h_index"),
            notable_authors_count: coerce_i64(row.scalar("notable_authors_count"), 0, "notable_authors_count"),
            author_h_indexes: self.author_h_indexes(row.scalar("author_h_indexes")),
        })
    }

    /// Assemble rows in order under `policy`.
    pub fn assemble_all<R: RowAccessor>(&self, rows: &[R], policy: FailurePolicy) -> Result<Vec<PaperRecord>> {
        let mut papers = Vec::with_capacity(rows.len());
        for row in rows {
            match self.assemble(row) {
                Ok(paper) => papers.push(paper),
                Err(e) => match policy {
                    FailurePolicy::SkipAndLog => {
                        error!("Error formatting paper data, skipping: {}", e);
                    }
                    FailurePolicy::Abort => return Err(e),
                },
            }
        }
        Ok(papers)
    }

    fn string_list(&self, raw: &Scalar, column: &str) -> Vec<String> {
        parse_list_field(raw, column)
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(self.pipeline.process_text_field(&s)),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                other => {
                    warn!(column, value = %other, "dropping non-string list element");
                    None
                }
            })
            .collect()
    }

    fn author_h_indexes(&self, raw: &Scalar) -> Vec<AuthorHIndex> {
        parse_list_field(raw, "author_h_indexes")
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(entry) => Some(AuthorHIndex {
                    name: self.pipeline.process_text_field(&value_as_text(entry.get("name"))),
                    h_index: value_as_int(entry.get("h_index")),
                    profile_url: value_as_text(entry.get("profile_url")),
                }),
                other => {
                    warn!(value = %other, "dropping non-object author h-index entry");
                    None
                }
            })
            .collect()
    }

    /// Apply the text pipeline to an exported paper object.
    ///
    /// Text fields are processed when present and non-empty; string elements
    /// of `authors` and `categories` are processed; everything else is kept.
    pub fn process_paper_value(&self, paper: &Value) -> Value {
        let Value::Object(fields) = paper else {
            return paper.clone();
        };

        let mut processed: Map<String, Value> = fields.clone();
        for field in EXPORT_TEXT_FIELDS {
            if let Some(value) = processed.get_mut(field) {
                if is_truthy(value) {
                    *value = self.pipeline.process_value(value);
                }
            }
        }
        for field in ["authors", "categories"] {
            if let Some(Value::Array(items)) = processed.get_mut(field) {
                for item in items.iter_mut() {
                    *item = self.pipeline.process_value(item);
                }
            }
        }
        Value::Object(processed)
    }
}

fn read_id(raw: &Scalar) -> Result<i64> {
    match raw {
        Scalar::Integer(i) => Ok(*i),
        Scalar::Text(s) => s.trim().parse::<i64>().map_err(|_| FeedError::RecordAssembly {
            id: s.clone(),
            reason: "id is not an integer".to_string(),
        }),
        other => Err(FeedError::RecordAssembly {
            id: "unknown".to_string(),
            reason: format!("id must be an integer, found {}", other.type_name()),
        }),
    }
}

fn value_as_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn value_as_int(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
