//! Static site build: one self-contained HTML page per publication date.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use paperfeed_common::{FeedError, Result};
use paperfeed_config::Config;
use paperfeed_core::{
    render_page, validate_date, FailurePolicy, MathSymbolTable, PagePayload, RecordAssembler,
    TextPipeline,
};
use paperfeed_db::{Database, PaperRepository};
use tracing::{error, info, warn};

use crate::output::write_atomic;

/// What to build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// A single date; every date in the store when absent.
    pub date: Option<String>,
    /// Cap on papers per page.
    pub max_papers: Option<usize>,
}

impl BuildOptions {
    pub fn validate(&self) -> Result<()> {
        if let Some(date) = &self.date {
            validate_date(date)?;
        }
        if self.max_papers == Some(0) {
            return Err(FeedError::Config(
                "max-papers must be a positive integer, got: 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a successful build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub pages: Vec<PathBuf>,
    /// Dates with no papers.
    pub skipped: Vec<String>,
}

pub struct SiteBuilder {
    papers: PaperRepository,
    assembler: RecordAssembler,
    template: String,
    output_dir: PathBuf,
}

impl SiteBuilder {
    pub fn new(
        papers: PaperRepository,
        assembler: RecordAssembler,
        template: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            papers,
            assembler,
            template: template.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Open the database and read the template named by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let template = read_template(&config.site.template)?;
        let db = Database::open(&config.database.path)?;
        let symbols = MathSymbolTable::builtin().with_overrides(&config.text.symbols);
        Ok(Self::new(
            PaperRepository::new(Arc::new(db)),
            RecordAssembler::new(TextPipeline::new(symbols)),
            template,
            config.site.output_dir.clone(),
        ))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Build every requested date. The first failing date stops the build.
    pub fn build(&self, options: &BuildOptions) -> Result<BuildReport> {
        options.validate()?;
        info!("Starting static site build");

        std::fs::create_dir_all(&self.output_dir)?;
        info!("Output directory: {}", self.output_dir.display());

        let dates = match &options.date {
            Some(date) => {
                info!("Building single date: {}", date);
                vec![date.clone()]
            }
            None => {
                let dates = self.papers.distinct_dates()?;
                info!("Building all dates: {} total", dates.len());
                dates
            }
        };

        let mut report = BuildReport::default();
        for date in dates {
            match self.build_date(&date, options.max_papers) {
                Ok(Some(path)) => report.pages.push(path),
                Ok(None) => report.skipped.push(date),
                Err(e) => {
                    error!(date = %date, "Failed to build page: {}", e);
                    return Err(e);
                }
            }
        }

        info!(
            "Build completed successfully. Generated {} pages in {}",
            report.pages.len(),
            self.output_dir.display()
        );
        Ok(report)
    }

    /// Build one page. `None` when the date has no papers.
    pub fn build_date(&self, date: &str, max_papers: Option<usize>) -> Result<Option<PathBuf>> {
        info!("Processing {}", date);
        let rows = self.papers.all_for_date(date, max_papers)?;
        if rows.is_empty() {
            warn!("Skipping {} - no papers found", date);
            return Ok(None);
        }

        let papers = self.assembler.assemble_all(&rows, FailurePolicy::Abort)?;
        let payload = PagePayload::new(date, papers);
        let html = render_page(&self.template, &payload)?;

        let path = self.output_dir.join(format!("{}.html", date));
        write_atomic(&path, html.as_bytes())?;
        info!("Generated {} with {} papers", path.display(), payload.total_papers);
        Ok(Some(path))
    }
}

pub(crate) fn read_template(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(FeedError::Config(format!(
            "Template file not found: {}",
            path.display()
        )));
    }
    let template = std::fs::read_to_string(path)?;
    info!("Loaded template from {}", path.display());
    Ok(template)
}
