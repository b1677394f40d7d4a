//! Column contract between the papers store and the record assembler.

/// Table holding one row per paper.
pub const TABLE_PAPERS: &str = "papers";

/// Scoring topics. Each contributes `<topic>_score`, `<topic>_relevance`
/// and `<topic>_justification` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Rlhf,
    WeakSupervision,
    DiffusionReasoning,
    DistributedTraining,
    Datasets,
}

impl Topic {
    pub const ALL: [Topic; 5] = [
        Topic::Rlhf,
        Topic::WeakSupervision,
        Topic::DiffusionReasoning,
        Topic::DistributedTraining,
        Topic::Datasets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Rlhf                => "rlhf",
            Topic::WeakSupervision     => "weak_supervision",
            Topic::DiffusionReasoning  => "diffusion_reasoning",
            Topic::DistributedTraining => "distributed_training",
            Topic::Datasets            => "datasets",
        }
    }

    pub fn score_column(&self) -> String {
        format!("{}_score", self.as_str())
    }

    pub fn relevance_column(&self) -> String {
        format!("{}_relevance", self.as_str())
    }

    pub fn justification_column(&self) -> String {
        format!("{}_justification", self.as_str())
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Columns holding JSON-encoded arrays as text.
pub const JSON_LIST_COLUMNS: [&str; 3] = ["authors", "categories", "author_h_indexes"];

/// Every column a paper row exposes, in canonical order.
pub const PAPER_COLUMNS: [&str; 43] = [
    "id",
    "title",
    "authors",
    "categories",
    "abstract",
    "published_date",
    "arxiv_url",
    "pdf_url",
    "scraper_status",
    "intro_status",
    "embedding_status",
    "rlhf_score",
    "weak_supervision_score",
    "diffusion_reasoning_score",
    "distributed_training_score",
    "datasets_score",
    "llm_validation_status",
    "rlhf_relevance",
    "weak_supervision_relevance",
    "diffusion_reasoning_relevance",
    "distributed_training_relevance",
    "datasets_relevance",
    "rlhf_justification",
    "weak_supervision_justification",
    "diffusion_reasoning_justification",
    "distributed_training_justification",
    "datasets_justification",
    "llm_score_status",
    "summary",
    "novelty_score",
    "novelty_justification",
    "impact_score",
    "impact_justification",
    "recommendation_score",
    "recommendation_justification",
    "h_index_status",
    "semantic_scholar_url",
    "total_authors",
    "authors_found",
    "highest_h_index",
    "average_h_index",
    "notable_authors_count",
    "author_h_indexes",
];

/// Free-text fields that go through the text pipeline.
pub fn text_columns() -> Vec<String> {
    let mut columns: Vec<String> = ["title", "abstract", "summary"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    columns.extend(Topic::ALL.iter().map(Topic::justification_column));
    columns.extend(
        ["novelty_justification", "impact_justification", "recommendation_justification"]
            .iter()
            .map(|c| c.to_string()),
    );
    columns
}

/// Comma-separated column list for `SELECT` statements.
pub fn select_list() -> String {
    PAPER_COLUMNS.join(", ")
}
