//! The fixed-shape paper record emitted by the API and embedded in pages.

use serde::{Deserialize, Serialize};

use crate::coercion::Numeric;

/// Per-author impact entry. Only these three keys survive assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorHIndex {
    pub name: String,
    pub h_index: i64,
    pub profile_url: String,
}

/// One paper, fully coerced and text-safe.
///
/// Every field is always serialized; nullable pass-through columns serialize
/// as `null` rather than disappearing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub id: i64,
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub published_date: Option<String>,
    pub arxiv_url: Option<String>,
    pub pdf_url: Option<String>,
    pub scraper_status: Option<String>,
    pub intro_status: Option<String>,
    pub embedding_status: Option<String>,

    pub rlhf_score: f64,
    pub weak_supervision_score: f64,
    pub diffusion_reasoning_score: f64,
    pub distributed_training_score: f64,
    pub datasets_score: f64,
    pub llm_validation_status: Option<String>,
    pub rlhf_relevance: Option<String>,
    pub weak_supervision_relevance: Option<String>,
    pub diffusion_reasoning_relevance: Option<String>,
    pub distributed_training_relevance: Option<String>,
    pub datasets_relevance: Option<String>,
    pub rlhf_justification: Option<String>,
    pub weak_supervision_justification: Option<String>,
    pub diffusion_reasoning_justification: Option<String>,
    pub distributed_training_justification: Option<String>,
    pub datasets_justification: Option<String>,
    pub llm_score_status: Option<String>,

    pub summary: Option<String>,
    pub novelty_score: Option<Numeric>,
    pub novelty_justification: Option<String>,
    pub impact_score: Option<Numeric>,
    pub impact_justification: Option<String>,
    pub recommendation_score: Option<Numeric>,
    pub recommendation_justification: Option<String>,

    pub h_index_status: Option<String>,
    pub semantic_scholar_url: Option<String>,
    pub total_authors: i64,
    pub authors_found: i64,
    pub highest_h_index: i64,
    pub average_h_index: f64,
    pub notable_authors_count: i64,
    pub author_h_indexes: Vec<AuthorHIndex>,
}
