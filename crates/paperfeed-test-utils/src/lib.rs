//! Shared fixtures: sample rows, on-disk papers databases and a page template.

use std::path::{Path, PathBuf};

use anyhow::Result;
use paperfeed_core::{RawRow, RowAccessor, Scalar, PAPER_COLUMNS};
use rusqlite::{params_from_iter, types::Value, Connection};
use serde_json::json;

/// The papers table as the upstream pipeline creates it.
pub const PAPERS_DDL: &str = r#"
CREATE TABLE papers (
    id INTEGER PRIMARY KEY,
    title TEXT,
    authors TEXT,
    categories TEXT,
    abstract TEXT,
    published_date TEXT,
    arxiv_url TEXT,
    pdf_url TEXT,
    scraper_status TEXT,
    intro_status TEXT,
    embedding_status TEXT,
    rlhf_score REAL,
    weak_supervision_score REAL,
    diffusion_reasoning_score REAL,
    distributed_training_score REAL,
    datasets_score REAL,
    llm_validation_status TEXT,
    rlhf_relevance TEXT,
    weak_supervision_relevance TEXT,
    diffusion_reasoning_relevance TEXT,
    distributed_training_relevance TEXT,
    datasets_relevance TEXT,
    rlhf_justification TEXT,
    weak_supervision_justification TEXT,
    diffusion_reasoning_justification TEXT,
    distributed_training_justification TEXT,
    datasets_justification TEXT,
    llm_score_status TEXT,
    summary TEXT,
    novelty_score REAL,
    novelty_justification TEXT,
    impact_score REAL,
    impact_justification TEXT,
    recommendation_score REAL,
    recommendation_justification TEXT,
    h_index_status TEXT,
    semantic_scholar_url TEXT,
    total_authors INTEGER,
    authors_found INTEGER,
    highest_h_index INTEGER,
    average_h_index REAL,
    notable_authors_count INTEGER,
    author_h_indexes TEXT
);
"#;

/// A page template carrying every placeholder the site builder fills.
pub const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><title>PLACEHOLDER_TITLE</title></head>
<body>
<h1 class="mobile">PLACEHOLDER_MOBILE_TITLE</h1>
<h1 class="desktop">PLACEHOLDER_DESKTOP_TITLE</h1>
<script>
const PAPERS_DATA = <!--DATA_HERE-->;
</script>
</body>
</html>
"#;

/// The text preceding the payload in [`PAGE_TEMPLATE`].
pub const PAYLOAD_MARKER: &str = "const PAPERS_DATA = ";

/// A fully populated row for paper `id`, published at midday on `date`.
pub fn sample_row(id: i64, date: &str) -> RawRow {
    RawRow::new()
        .with("id", id)
        .with("title", format!("Paper {} on $\\alpha$-divergence <RLHF>", id))
        .with("authors", json!(["Ada Lovelace", "Grace Hopper"]).to_string())
        .with("categories", json!(["cs.LG", "cs.AI"]).to_string())
        .with("abstract", "We bound $$x^2 \\leq y$$ & more.")
        .with("published_date", format!("{}T12:00:00Z", date))
        .with("arxiv_url", format!("https://arxiv.org/abs/2507.{:05}", id))
        .with("pdf_url", format!("https://arxiv.org/pdf/2507.{:05}", id))
        .with("scraper_status", "completed")
        .with("intro_status", "completed")
        .with("embedding_status", "completed")
        .with("rlhf_score", 0.82)
        .with("weak_supervision_score", 0.1)
        .with("diffusion_reasoning_score", None::<f64>)
        .with("distributed_training_score", 0.0)
        .with("datasets_score", 0.4)
        .with("llm_validation_status", "completed")
        .with("rlhf_relevance", "Highly Relevant")
        .with("weak_supervision_relevance", "Not Relevant")
        .with("diffusion_reasoning_relevance", None::<String>)
        .with("distributed_training_relevance", "Not Relevant")
        .with("datasets_relevance", "Tangentially Relevant")
        .with("rlhf_justification", "Uses reward models with $r_\\theta$.")
        .with("weak_supervision_justification", "No labels <involved>.")
        .with("diffusion_reasoning_justification", None::<String>)
        .with("distributed_training_justification", "Single GPU.")
        .with("datasets_justification", "Releases a small benchmark.")
        .with("llm_score_status", "completed")
        .with("summary", "A short summary & takeaway.")
        .with("novelty_score", 7i64)
        .with("novelty_justification", "New objective.")
        .with("impact_score", 6.5)
        .with("impact_justification", "Moderate.")
        .with("recommendation_score", None::<f64>)
        .with("recommendation_justification", None::<String>)
        .with("h_index_status", "completed")
        .with("semantic_scholar_url", format!("https://www.semanticscholar.org/arxiv/2507.{:05}", id))
        .with("total_authors", 2i64)
        .with("authors_found", 2i64)
        .with("highest_h_index", 45i64)
        .with("average_h_index", 30.5)
        .with("notable_authors_count", 1i64)
        .with(
            "author_h_indexes",
            json!([
                {"name": "Ada Lovelace", "h_index": 45, "profile_url": "https://s2/ada", "affiliation": "x"},
                {"name": "Grace Hopper", "h_index": 16, "profile_url": "https://s2/grace"}
            ])
            .to_string(),
        )
}

/// `count` sample rows for `date`, ids starting at `first_id`.
pub fn rows_for_date(date: &str, first_id: i64, count: usize) -> Vec<RawRow> {
    (0..count as i64).map(|i| sample_row(first_id + i, date)).collect()
}

fn to_sql(value: &Scalar) -> Value {
    match value {
        Scalar::Null => Value::Null,
        Scalar::Integer(i) => Value::Integer(*i),
        Scalar::Real(f) => Value::Real(*f),
        Scalar::Text(s) => Value::Text(s.clone()),
    }
}

/// Insert `rows` into an existing papers table. Columns a row leaves out
/// are stored as NULL.
pub fn insert_rows(conn: &mut Connection, rows: &[RawRow]) -> Result<()> {
    let placeholders = vec!["?"; PAPER_COLUMNS.len()].join(", ");
    let sql = format!(
        "INSERT INTO papers ({}) VALUES ({})",
        PAPER_COLUMNS.join(", "),
        placeholders
    );

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(&sql)?;
        for row in rows {
            let values = PAPER_COLUMNS.iter().map(|c| to_sql(row.scalar(c)));
            stmt.execute(params_from_iter(values))?;
        }
    }
    tx.commit()?;
    Ok(())
}

/// Create `<dir>/cache.db` holding `rows`.
pub fn create_papers_db(dir: &Path, rows: &[RawRow]) -> Result<PathBuf> {
    let path = dir.join("cache.db");
    let mut conn = Connection::open(&path)?;
    conn.execute_batch(PAPERS_DDL)?;
    insert_rows(&mut conn, rows)?;
    Ok(path)
}

/// Like [`create_papers_db`], but every column except `id` is declared
/// without a type, so SQLite keeps each value's storage class as inserted.
/// Used to reproduce rows whose text columns hold numbers.
pub fn create_untyped_papers_db(dir: &Path, rows: &[RawRow]) -> Result<PathBuf> {
    let columns: Vec<String> = PAPER_COLUMNS
        .iter()
        .map(|c| if *c == "id" { "id INTEGER PRIMARY KEY".to_string() } else { c.to_string() })
        .collect();
    let path = dir.join("cache.db");
    let mut conn = Connection::open(&path)?;
    conn.execute_batch(&format!("CREATE TABLE papers ({});", columns.join(", ")))?;
    insert_rows(&mut conn, rows)?;
    Ok(path)
}

/// Pull the embedded payload back out of a page rendered from
/// [`PAGE_TEMPLATE`].
pub fn extract_payload(html: &str) -> Result<serde_json::Value> {
    let start = html
        .find(PAYLOAD_MARKER)
        .ok_or_else(|| anyhow::anyhow!("payload marker not found"))?
        + PAYLOAD_MARKER.len();
    let value = serde_json::Deserializer::from_str(&html[start..])
        .into_iter::<serde_json::Value>()
        .next()
        .ok_or_else(|| anyhow::anyhow!("no JSON after payload marker"))??;
    Ok(value)
}
