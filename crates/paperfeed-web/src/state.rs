//! Shared application state for the web server.

use std::sync::Arc;

use paperfeed_config::{Config, ServerConfig};
use paperfeed_core::{MathSymbolTable, RecordAssembler, TextPipeline};
use paperfeed_db::{Database, PaperRepository};

/// Shared state injected into every Axum handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub papers: PaperRepository,
    pub assembler: RecordAssembler,
    pub server: ServerConfig,
}

impl AppState {
    pub fn new(papers: PaperRepository, assembler: RecordAssembler, server: ServerConfig) -> Self {
        Self { papers, assembler, server }
    }

    /// Open the configured database and build the text pipeline.
    pub fn from_config(config: &Config) -> paperfeed_db::Result<Self> {
        let db = Database::open(&config.database.path)?;
        let symbols = MathSymbolTable::builtin().with_overrides(&config.text.symbols);
        Ok(Self::new(
            PaperRepository::new(Arc::new(db)),
            RecordAssembler::new(TextPipeline::new(symbols)),
            config.server.clone(),
        ))
    }
}

pub type SharedState = Arc<AppState>;
