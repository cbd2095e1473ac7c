//! Periodic ingestion over the configured search terms.
//!
//! `--once` (or `INGEST_SCHEDULE=once`) runs every term immediately and exits
//! with the run's status: 0 all terms succeeded, 2 partial success, 1 none.
//! Otherwise runs on `INGEST_SCHEDULE` until Ctrl+C.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use ingest_core::scheduler::{self, RunMode};
use ingest_core::{Config, PostgresLoader, Runner, RunnerConfig};
use remotive_client::RemotiveClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ingest_scheduler")]
#[command(about = "Ingest remote job postings for every configured term, once or on a schedule")]
struct Cli {
    /// Run all terms once and exit instead of waiting on the schedule
    #[arg(long)]
    once: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,
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

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        terms = ?config.search_terms,
        schedule = %config.schedule,
        "Configuration loaded"
    );

    let runner = Arc::new(Runner::new(
        Arc::new(RemotiveClient::with_base_url(config.api_url.clone())),
        Arc::new(PostgresLoader::new(config.database.connect_options())),
        RunnerConfig::from(&config),
    ));

    let mode = RunMode::from_config(&config, cli.once);
    let exit_on_completion = mode == RunMode::Once;

    let report = scheduler::run(runner, mode).await?;

    if let Some(report) = &report {
        if cli.json {
            println!("{}", serde_json::to_string(report)?);
        }
        if exit_on_completion {
            std::process::exit(report.exit_code());
        }
    }

    Ok(())
}
