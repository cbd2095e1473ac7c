//! Sequential fetch → transform → load over a fixed list of search terms.
//!
//! ```text
//! Runner::run_all()
//!     │
//!     └─► for each term (pause between terms)
//!             ├─► BaseJobSource::fetch      (failure → term failed, next term)
//!             ├─► transform()
//!             └─► BasePostingSink::load     (failure → term failed, next term)
//! ```
//!
//! Terms never run concurrently. A failing term is recorded in the
//! [`RunReport`] and never aborts the rest of the run.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use remotive_client::JobSearch;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::transform::transform;
use crate::traits::{BaseJobSource, BasePostingSink};

/// Configuration for the runner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub terms: Vec<String>,
    pub limit: u32,
    pub category: Option<String>,
    pub fetch_timeout: Duration,
    /// Fixed delay between consecutive terms
    pub term_pause: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            terms: crate::config::DEFAULT_SEARCH_TERMS
                .iter()
                .map(|t| t.to_string())
                .collect(),
            limit: 1000,
            category: None,
            fetch_timeout: Duration::from_secs(1000),
            term_pause: Duration::from_secs(60),
        }
    }
}

impl From<&Config> for RunnerConfig {
    fn from(config: &Config) -> Self {
        Self {
            terms: config.search_terms.clone(),
            limit: config.limit,
            category: config.category.clone(),
            fetch_timeout: config.fetch_timeout,
            term_pause: config.term_pause,
        }
    }
}

/// Pipeline stage a term failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fetch,
    Load,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Fetch => write!(f, "fetch"),
            Stage::Load => write!(f, "load"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TermStatus {
    Succeeded,
    Failed { stage: Stage, error: String },
}

/// Outcome of one term's fetch → transform → load.
#[derive(Debug, Clone, Serialize)]
pub struct TermReport {
    pub term: String,
    pub fetched: usize,
    pub transformed: usize,
    pub dropped: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub status: TermStatus,
}

impl TermReport {
    fn new(term: &str) -> Self {
        Self {
            term: term.to_string(),
            fetched: 0,
            transformed: 0,
            dropped: 0,
            inserted: 0,
            skipped: 0,
            status: TermStatus::Succeeded,
        }
    }

    fn failed(mut self, stage: Stage, error: impl fmt::Display) -> Self {
        self.status = TermStatus::Failed {
            stage,
            error: error.to_string(),
        };
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == TermStatus::Succeeded
    }
}

/// Per-term outcomes of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub terms: Vec<TermReport>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.terms.iter().filter(|t| t.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.terms.len() - self.succeeded()
    }

    pub fn total_inserted(&self) -> usize {
        self.terms.iter().map(|t| t.inserted).sum()
    }

    /// `0` when every term succeeded, `2` on partial success, `1` otherwise.
    pub fn exit_code(&self) -> i32 {
        match (self.succeeded(), self.failed()) {
            (0, _) => 1,
            (_, 0) => 0,
            _ => 2,
        }
    }

    pub fn log_summary(&self) {
        for term in &self.terms {
            if let TermStatus::Failed { stage, error } = &term.status {
                warn!(term = %term.term, %stage, %error, "Term failed");
            }
        }
        info!(
            succeeded = self.succeeded(),
            failed = self.failed(),
            inserted = self.total_inserted(),
            elapsed_ms = (self.finished_at - self.started_at).num_milliseconds(),
            "Ingestion run finished"
        );
    }
}

pub struct Runner {
    source: Arc<dyn BaseJobSource>,
    sink: Arc<dyn BasePostingSink>,
    config: RunnerConfig,
}

impl Runner {
    pub fn new(
        source: Arc<dyn BaseJobSource>,
        sink: Arc<dyn BasePostingSink>,
        config: RunnerConfig,
    ) -> Self {
        Self {
            source,
            sink,
            config,
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run every configured term once, in order.
    pub async fn run_all(&self) -> RunReport {
        let started_at = Utc::now();
        let mut terms = Vec::with_capacity(self.config.terms.len());

        for (i, term) in self.config.terms.iter().enumerate() {
            if i > 0 && !self.config.term_pause.is_zero() {
                tokio::time::sleep(self.config.term_pause).await;
            }
            info!(term = %term, "Running for term");
            terms.push(self.run_term(term).await);
        }

        RunReport {
            started_at,
            finished_at: Utc::now(),
            terms,
        }
    }

    /// Fetch, transform and load a single term.
    pub async fn run_term(&self, term: &str) -> TermReport {
        let mut search = JobSearch::new(term)
            .with_limit(self.config.limit)
            .with_timeout(self.config.fetch_timeout);
        if let Some(category) = &self.config.category {
            search = search.with_category(category.clone());
        }

        let mut report = TermReport::new(term);

        let raw = match self.source.fetch(&search).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(term = %term, error = %e, "Fetch failed, skipping term");
                return report.failed(Stage::Fetch, e);
            }
        };
        report.fetched = raw.len();

        let batch = transform(&raw);
        report.transformed = batch.postings.len();
        report.dropped = batch.dropped;

        match self.sink.load(&batch.postings).await {
            Ok(load) => {
                report.inserted = load.inserted;
                report.skipped = load.skipped;
                report
            }
            Err(e) => {
                warn!(term = %term, error = %e, "Load failed, batch rolled back");
                report.failed(Stage::Load, e)
            }
        }
    }
}
