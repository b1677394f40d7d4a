//! Paperfeed Web Server
//!
//! Run with: cargo run -p paperfeed-web

use paperfeed_config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("paperfeed=debug,tower_http=info,info")),
        )
        .init();

    info!("Starting Research Feed API server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    info!("Database: {}", config.database.path.display());

    let state = paperfeed_web::state::AppState::from_config(&config)?;
    let app = paperfeed_web::router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
