//! Print stored postings and the most common job types.

use anyhow::{Context, Result};
use clap::Parser;
use ingest_core::config::DatabaseConfig;
use ingest_core::Posting;
use sqlx::{Connection, PgConnection};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "show_postings")]
#[command(about = "Show the newest stored postings")]
struct Cli {
    /// Number of postings to print
    #[arg(long, default_value_t = 20)]
    limit: i64,

    /// Number of job types to summarize
    #[arg(long, default_value_t = 5)]
    top: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let cli = Cli::parse();

    let database = DatabaseConfig::from_env().context("Failed to load database configuration")?;
    let mut conn = PgConnection::connect_with(&database.connect_options())
        .await
        .context("Failed to connect to database")?;

    let postings = Posting::list(cli.limit, &mut conn)
        .await
        .context("Failed to read postings")?;
    let total = Posting::count(&mut conn).await?;
    let job_types = Posting::top_job_types(cli.top, &mut conn).await?;
    conn.close().await?;

    println!("{:>8}  {:<10}  {:<12}  {:<30}  {}", "id", "date", "job_type", "company", "title");
    for p in &postings {
        let date = p
            .publication_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>8}  {:<10}  {:<12}  {:<30}  {}",
            p.id,
            date,
            p.job_type,
            truncate(&p.company_name, 30),
            p.title
        );
    }
    println!("\n{} of {} postings shown", postings.len(), total);

    println!("\nTop job types:");
    for jt in &job_types {
        println!("  {:<20} {}", jt.job_type, jt.postings);
    }

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
