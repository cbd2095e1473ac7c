//! Scheduled ingestion using tokio-cron-scheduler.
//!
//! The scheduler is an owned object: the caller starts it, keeps it, and
//! shuts it down. Nothing is registered in process-wide state.
//!
//! ```text
//! IngestScheduler (cron, default daily 03:00 UTC)
//!     │
//!     └─► Runner::run_all()   (tick skipped while a run is in flight)
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::config::Config;
use crate::runner::{RunReport, Runner};

/// How the batch is triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Run every term once, then return.
    Once,
    /// Run on a cron schedule until shutdown, optionally once at startup too.
    Scheduled { cron: String, run_on_startup: bool },
}

impl RunMode {
    /// `--once` or `INGEST_SCHEDULE=once` runs a single batch; anything else is a cron expression.
    pub fn from_config(config: &Config, once: bool) -> Self {
        if once || config.runs_once() {
            RunMode::Once
        } else {
            RunMode::Scheduled {
                cron: config.schedule.clone(),
                run_on_startup: config.run_on_startup,
            }
        }
    }
}

pub struct IngestScheduler {
    scheduler: JobScheduler,
    running: Arc<Mutex<()>>,
}

impl IngestScheduler {
    /// Register the ingest job on `cron` and start ticking.
    pub async fn start(runner: Arc<Runner>, cron: &str) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .context("Failed to create job scheduler")?;
        let running = Arc::new(Mutex::new(()));

        let job_runner = runner.clone();
        let job_running = running.clone();
        let ingest_job = Job::new_async(cron, move |_uuid, _lock| {
            let runner = job_runner.clone();
            let running = job_running.clone();
            Box::pin(async move {
                let Ok(_guard) = running.try_lock() else {
                    tracing::warn!("Previous ingestion run still in progress, skipping tick");
                    return;
                };
                let report = runner.run_all().await;
                report.log_summary();
            })
        })
        .with_context(|| format!("Invalid ingest schedule: {}", cron))?;

        scheduler.add(ingest_job).await?;
        scheduler.start().await?;

        tracing::info!(schedule = %cron, terms = runner.config().terms.len(), "Ingest scheduler started");
        Ok(Self { scheduler, running })
    }

    /// Run the batch now, outside the schedule, waiting for any in-flight run first.
    pub async fn run_now(&self, runner: &Runner) -> RunReport {
        let _guard = self.running.lock().await;
        let report = runner.run_all().await;
        report.log_summary();
        report
    }

    /// Stop ticking. A run already in flight finishes on its own task.
    pub async fn shutdown(mut self) -> Result<()> {
        self.scheduler
            .shutdown()
            .await
            .context("Failed to shut down job scheduler")?;
        tracing::info!("Ingest scheduler stopped");
        Ok(())
    }
}

/// Run according to `mode`.
///
/// `Once` returns the run's report. `Scheduled` blocks until Ctrl+C and
/// returns the startup run's report, if one was requested.
pub async fn run(runner: Arc<Runner>, mode: RunMode) -> Result<Option<RunReport>> {
    match mode {
        RunMode::Once => {
            let report = runner.run_all().await;
            report.log_summary();
            Ok(Some(report))
        }
        RunMode::Scheduled {
            cron,
            run_on_startup,
        } => {
            let scheduler = IngestScheduler::start(runner.clone(), &cron).await?;

            let startup_report = if run_on_startup {
                Some(scheduler.run_now(&runner).await)
            } else {
                None
            };

            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for shutdown signal")?;
            tracing::info!("Received shutdown signal");

            scheduler.shutdown().await?;
            Ok(startup_report)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::RunnerConfig;
    use crate::test_dependencies::{MockJobSource, MockPostingSink};
    use std::time::Duration;

    fn runner(source: &MockJobSource) -> Arc<Runner> {
        Arc::new(Runner::new(
            Arc::new(source.clone()),
            Arc::new(MockPostingSink::new()),
            RunnerConfig {
                terms: vec!["python".to_string()],
                term_pause: Duration::ZERO,
                ..Default::default()
            },
        ))
    }

    fn config(schedule: &str, run_on_startup: bool) -> Config {
        let vars = [
            ("PG_DB", "jobs".to_string()),
            ("PG_USER", "ingest".to_string()),
            ("INGEST_SCHEDULE", schedule.to_string()),
            ("INGEST_RUN_ON_STARTUP", run_on_startup.to_string()),
        ];
        Config::from_vars(|key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    #[test]
    fn mode_follows_flag_and_schedule() {
        assert_eq!(
            RunMode::from_config(&config("0 0 3 * * *", true), false),
            RunMode::Scheduled {
                cron: "0 0 3 * * *".to_string(),
                run_on_startup: true,
            }
        );
        assert_eq!(
            RunMode::from_config(&config("0 */5 * * * *", false), false),
            RunMode::Scheduled {
                cron: "0 */5 * * * *".to_string(),
                run_on_startup: false,
            }
        );
        assert_eq!(
            RunMode::from_config(&config("0 0 3 * * *", true), true),
            RunMode::Once
        );
        assert_eq!(
            RunMode::from_config(&config("once", false), false),
            RunMode::Once
        );
        assert_eq!(
            RunMode::from_config(&config(" Once ", true), false),
            RunMode::Once
        );
    }

    #[tokio::test]
    async fn invalid_cron_is_rejected() {
        let source = MockJobSource::new();
        let result = IngestScheduler::start(runner(&source), "every day at three").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn once_mode_runs_each_term_once() {
        let source = MockJobSource::new();
        let report = run(runner(&source), RunMode::Once).await.unwrap().unwrap();

        assert_eq!(report.terms.len(), 1);
        assert_eq!(source.searched_terms(), vec!["python"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn scheduled_job_fires_until_shutdown() {
        let source = MockJobSource::new();
        let scheduler = IngestScheduler::start(runner(&source), "* * * * * *")
            .await
            .unwrap();

        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        while source.calls().is_empty() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        scheduler.shutdown().await.unwrap();

        assert!(!source.calls().is_empty());
    }

    #[tokio::test]
    async fn run_now_uses_the_same_runner() {
        let source = MockJobSource::new();
        let runner = runner(&source);
        let scheduler = IngestScheduler::start(runner.clone(), "0 0 3 * * *")
            .await
            .unwrap();

        let report = scheduler.run_now(&runner).await;
        scheduler.shutdown().await.unwrap();

        assert_eq!(report.exit_code(), 0);
        assert_eq!(source.searched_terms(), vec!["python"]);
    }
}
