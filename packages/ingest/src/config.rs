use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use sqlx::postgres::PgConnectOptions;

pub const DEFAULT_SEARCH_TERMS: &[&str] = &["python", "data", "devops", "machine learning"];

/// Daily at 03:00 (UTC), six-field cron with seconds.
pub const DEFAULT_SCHEDULE: &str = "0 0 3 * * *";

/// Postgres connection parameters.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub api_url: String,
    pub search_terms: Vec<String>,
    pub limit: u32,
    pub category: Option<String>,
    pub fetch_timeout: Duration,
    pub term_pause: Duration,
    pub schedule: String,
    pub run_on_startup: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from a variable lookup, applying defaults for unset keys.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            database: DatabaseConfig::from_vars(&var)?,
            api_url: var("REMOTIVE_API_URL")
                .unwrap_or_else(|| remotive_client::DEFAULT_BASE_URL.to_string()),
            search_terms: var("INGEST_SEARCH_TERMS")
                .map(|raw| parse_terms(&raw))
                .unwrap_or_else(|| DEFAULT_SEARCH_TERMS.iter().map(|t| t.to_string()).collect()),
            limit: var("INGEST_LIMIT")
                .unwrap_or_else(|| "1000".to_string())
                .parse()
                .context("INGEST_LIMIT must be a valid number")?,
            category: var("INGEST_CATEGORY").filter(|c| !c.is_empty()),
            fetch_timeout: Duration::from_secs(
                var("INGEST_FETCH_TIMEOUT_SECS")
                    .unwrap_or_else(|| "1000".to_string())
                    .parse()
                    .context("INGEST_FETCH_TIMEOUT_SECS must be a valid number")?,
            ),
            term_pause: Duration::from_secs(
                var("INGEST_TERM_PAUSE_SECS")
                    .unwrap_or_else(|| "60".to_string())
                    .parse()
                    .context("INGEST_TERM_PAUSE_SECS must be a valid number")?,
            ),
            schedule: var("INGEST_SCHEDULE").unwrap_or_else(|| DEFAULT_SCHEDULE.to_string()),
            run_on_startup: parse_flag(
                &var("INGEST_RUN_ON_STARTUP").unwrap_or_else(|| "true".to_string()),
            )
            .context("INGEST_RUN_ON_STARTUP must be true or false")?,
        })
    }

    /// `INGEST_SCHEDULE=once` asks for a single run instead of a cron schedule.
    pub fn runs_once(&self) -> bool {
        self.schedule.trim().eq_ignore_ascii_case("once")
    }
}

impl DatabaseConfig {
    /// Load `PG_*` connection variables.
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();

        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            host: var("PG_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: var("PG_PORT")
                .unwrap_or_else(|| "5432".to_string())
                .parse()
                .context("PG_PORT must be a valid number")?,
            database: var("PG_DB").context("PG_DB must be set")?,
            user: var("PG_USER").context("PG_USER must be set")?,
            password: var("PG_PASSWORD").unwrap_or_default(),
        })
    }
}

/// Split a comma-separated term list, dropping blanks.
pub fn parse_terms(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("invalid boolean: {}", other),
    }
}
