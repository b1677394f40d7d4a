//! Paperfeed static site tools
//!
//! Run with: cargo run -p paperfeed-site -- build --date 2025-07-15

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use paperfeed_config::Config;
use paperfeed_core::{MathSymbolTable, RecordAssembler, TextPipeline};
use paperfeed_site::{generate_dashboard, process_file, BuildOptions, SiteBuilder};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "paperfeed-site",
    version,
    about = "Build static HTML pages from the research paper database"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build one page per publication date
    Build(BuildArgs),
    /// Run the text pipeline over an exported papers JSON file
    Process(ProcessArgs),
    /// Generate a dashboard page from an exported papers JSON file
    Dashboard(DashboardArgs),
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Build only this date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<String>,
    /// Maximum number of papers per date
    #[arg(long)]
    max_papers: Option<usize>,
    /// SQLite database (defaults to [database] path)
    #[arg(long)]
    database: Option<PathBuf>,
    /// Page template (defaults to [site] template)
    #[arg(long)]
    template: Option<PathBuf>,
    /// Output directory (defaults to [site] output_dir)
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ProcessArgs {
    #[arg(long)]
    input: PathBuf,
    #[arg(long)]
    output: PathBuf,
    /// Drop entries that are not objects with more than one key
    #[arg(long)]
    skip_minimal: bool,
}

#[derive(Args, Debug)]
struct DashboardArgs {
    #[arg(long)]
    input: PathBuf,
    #[arg(long)]
    template: PathBuf,
    #[arg(long)]
    output: PathBuf,
}

fn assembler(config: &Config) -> RecordAssembler {
    let symbols = MathSymbolTable::builtin().with_overrides(&config.text.symbols);
    RecordAssembler::new(TextPipeline::new(symbols))
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("paperfeed=debug,info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;

    match cli.command {
        Command::Build(args) => {
            let options = BuildOptions {
                date: args.date,
                max_papers: args.max_papers,
            };
            // Reject bad arguments before touching the database.
            options.validate()?;

            if let Some(path) = args.database {
                config.database.path = path;
            }
            if let Some(path) = args.template {
                config.site.template = path;
            }
            if let Some(dir) = args.output_dir {
                config.site.output_dir = dir;
            }

            let report = SiteBuilder::from_config(&config)?.build(&options)?;
            info!(
                pages = report.pages.len(),
                skipped = report.skipped.len(),
                "Build finished"
            );
        }
        Command::Process(args) => {
            let doc = process_file(&args.input, &args.output, &assembler(&config), args.skip_minimal)?;
            info!("Processed {} papers into {}", doc.total_papers, args.output.display());
        }
        Command::Dashboard(args) => {
            let doc = generate_dashboard(&args.input, &args.template, &args.output, &assembler(&config))?;
            info!("Dashboard {} holds {} papers", args.output.display(), doc.papers.len());
        }
    }

    Ok(())
}
