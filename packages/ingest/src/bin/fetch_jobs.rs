//! One fetch → transform → load cycle for a single search term.
//!
//! Exits 0 when the term was fetched and loaded, 1 otherwise.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use ingest_core::config::DatabaseConfig;
use ingest_core::{PostgresLoader, Runner, RunnerConfig};
use remotive_client::RemotiveClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fetch_jobs")]
#[command(about = "Fetch remote job postings for one search term and store them")]
struct Cli {
    /// Search keyword sent to the listings API
    #[arg(long)]
    search: String,

    /// Maximum number of listings to request
    #[arg(long, default_value_t = 1000)]
    limit: u32,

    /// Optional category filter
    #[arg(long)]
    category: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 1000)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ingest_core=debug,sqlx=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let cli = Cli::parse();

    let database = DatabaseConfig::from_env().context("Failed to load database configuration")?;
    let client = match std::env::var("REMOTIVE_API_URL") {
        Ok(url) => RemotiveClient::with_base_url(url),
        Err(_) => RemotiveClient::new(),
    };

    let runner = Runner::new(
        Arc::new(client),
        Arc::new(PostgresLoader::new(database.connect_options())),
        RunnerConfig {
            terms: vec![cli.search.clone()],
            limit: cli.limit,
            category: cli.category,
            fetch_timeout: Duration::from_secs(cli.timeout_secs),
            term_pause: Duration::ZERO,
        },
    );

    let report = runner.run_all().await;
    report.log_summary();

    std::process::exit(report.exit_code());
}
