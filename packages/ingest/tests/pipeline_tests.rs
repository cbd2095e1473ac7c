//! End-to-end runs: real HTTP client against the stub listings API, real Postgres loader.

mod common;

use std::sync::Arc;
use std::time::Duration;

use crate::common::{raw_job, TestHarness};
use ingest_core::{Posting, Runner, RunnerConfig, Stage, TermStatus};
use remotive_client::stub::{RunningStub, StubApi};
use remotive_client::{RawJob, RemotiveClient};
use test_context::test_context;

/// Stub API with the listings used across these tests.
async fn start_stub_api() -> RunningStub {
    let mut python: Vec<RawJob> = (1..=8).map(raw_job).collect();
    python[4].salary = None;

    StubApi::new()
        .with_jobs("python", python)
        .with_jobs("data", vec![raw_job(7), raw_job(8), raw_job(20)])
        .with_jobs("machine learning", vec![raw_job(30)])
        .with_delay("slow", Duration::from_secs(30))
        .start()
        .await
        .unwrap()
}

fn runner(ctx: &TestHarness, api: &RunningStub, terms: &[&str], limit: u32) -> Runner {
    Runner::new(
        Arc::new(RemotiveClient::with_base_url(api.url())),
        Arc::new(ctx.loader()),
        RunnerConfig {
            terms: terms.iter().map(|t| t.to_string()).collect(),
            limit,
            category: None,
            fetch_timeout: Duration::from_millis(500),
            term_pause: Duration::from_millis(10),
        },
    )
}

#[test_context(TestHarness)]
#[tokio::test]
async fn timed_out_term_is_skipped_and_run_continues(ctx: &mut TestHarness) {
    let api = start_stub_api().await;
    let runner = runner(ctx, &api, &["slow", "python", "data"], 100);

    let report = runner.run_all().await;

    assert_eq!(report.terms.len(), 3);
    assert!(matches!(
        report.terms[0].status,
        TermStatus::Failed { stage: Stage::Fetch, .. }
    ));
    assert!(report.terms[1].is_success());
    assert!(report.terms[2].is_success());
    assert_eq!(report.exit_code(), 2);

    // python: 8 new; data: 7 and 8 already stored, 20 new.
    assert_eq!(report.terms[1].inserted, 8);
    assert_eq!(report.terms[2].inserted, 1);
    assert_eq!(report.terms[2].skipped, 2);

    let mut conn = ctx.connect().await;
    assert_eq!(Posting::count(&mut conn).await.unwrap(), 9);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn fetched_rows_respect_limit(ctx: &mut TestHarness) {
    let api = start_stub_api().await;
    let runner = runner(ctx, &api, &["python"], 5);

    let report = runner.run_all().await;

    assert_eq!(report.exit_code(), 0);
    let term = &report.terms[0];
    assert!(term.fetched <= 5);
    assert!(term.transformed <= 5);
    assert_eq!(term.transformed, 5);

    let mut conn = ctx.connect().await;
    let stored = Posting::list(10, &mut conn).await.unwrap();
    assert_eq!(stored.len(), 5);
    let missing_salary = stored.iter().find(|p| p.id == 5).unwrap();
    assert_eq!(missing_salary.salary, "");
    assert!(stored.iter().filter(|p| p.id != 5).all(|p| p.salary == "$90k"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn repeated_run_changes_nothing(ctx: &mut TestHarness) {
    let api = start_stub_api().await;
    let runner = runner(ctx, &api, &["python", "data"], 100);

    let first = runner.run_all().await;
    let mut conn = ctx.connect().await;
    let before = Posting::list(100, &mut conn).await.unwrap();

    let second = runner.run_all().await;
    let after = Posting::list(100, &mut conn).await.unwrap();

    assert_eq!(first.total_inserted(), 9);
    assert_eq!(second.total_inserted(), 0);
    assert_eq!(second.exit_code(), 0);
    assert_eq!(before, after);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unreachable_database_fails_load_stage(ctx: &mut TestHarness) {
    let api = start_stub_api().await;
    let mut database = ctx.database.clone();
    database.database = "does_not_exist".to_string();

    let runner = Runner::new(
        Arc::new(RemotiveClient::with_base_url(api.url())),
        Arc::new(ingest_core::PostgresLoader::new(database.connect_options())),
        RunnerConfig {
            terms: vec!["python".to_string()],
            limit: 10,
            category: None,
            fetch_timeout: Duration::from_secs(5),
            term_pause: Duration::ZERO,
        },
    );

    let report = runner.run_all().await;

    assert_eq!(report.exit_code(), 1);
    assert!(matches!(
        report.terms[0].status,
        TermStatus::Failed { stage: Stage::Load, .. }
    ));
    assert_eq!(report.terms[0].fetched, 8);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn multi_word_term_reaches_the_api_decoded(ctx: &mut TestHarness) {
    let api = start_stub_api().await;
    let runner = runner(ctx, &api, &["machine learning"], 100);

    let report = runner.run_all().await;

    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.terms[0].inserted, 1);
    assert_eq!(api.requests()[0]["search"], "machine learning");

    let mut conn = ctx.connect().await;
    assert!(Posting::find_by_id(30, &mut conn).await.unwrap().is_some());
}
