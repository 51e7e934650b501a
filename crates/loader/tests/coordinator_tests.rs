//! Integration tests for the runner fan-out.
//!
//! Uses an in-memory fetcher and a recording executor so the whole flow runs
//! without a cluster or network access.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use cqlboot_core::{ClusterConfig, FailureKind, RunOutcome, ScriptSource};
use cqlboot_loader::cluster::ConnectionError;
use cqlboot_loader::coordinator;
use cqlboot_loader::fetcher::FetchError;
use cqlboot_loader::runner::{ScriptFetcher, StatementExecutor};

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Records every executed statement; fails or panics on chosen statements.
#[derive(Default)]
struct RecordingExecutor {
    executed: Mutex<Vec<String>>,
    fail_on: Vec<&'static str>,
    panic_on: Option<&'static str>,
}

impl RecordingExecutor {
    fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

impl StatementExecutor for RecordingExecutor {
    type Error = String;

    async fn execute(&self, statement: &str) -> Result<(), String> {
        tokio::task::yield_now().await;
        if self.panic_on == Some(statement) {
            panic!("executor blew up on {statement}");
        }
        if self.fail_on.iter().any(|f| *f == statement) {
            return Err(format!("rejected {statement}"));
        }
        self.executed.lock().unwrap().push(statement.to_string());
        Ok(())
    }
}

/// Serves script bodies from memory and counts fetches.
#[derive(Default)]
struct MemoryFetcher {
    scripts: HashMap<String, String>,
    fetches: AtomicUsize,
}

impl MemoryFetcher {
    fn with(scripts: &[(&str, &str)]) -> Self {
        Self {
            scripts: scripts
                .iter()
                .map(|(u, b)| (u.to_string(), b.to_string()))
                .collect(),
            fetches: AtomicUsize::new(0),
        }
    }
}

impl ScriptFetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.scripts
            .get(url)
            .cloned()
            .ok_or(FetchError::HttpStatus(404))
    }
}

fn sources(urls: &[&str]) -> Vec<ScriptSource> {
    urls.iter().map(|u| ScriptSource::new(*u)).collect()
}

fn outcome_for<'a>(outcomes: &'a [RunOutcome], url: &str) -> &'a RunOutcome {
    outcomes
        .iter()
        .find(|o| o.url().url() == url)
        .expect("outcome for every source")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// All four sources succeed: one success outcome each, no error text.
#[tokio::test]
async fn all_sources_succeed() {
    let fetcher = MemoryFetcher::with(&[
        ("a", "A1;\nA2;"),
        ("b", "B1;\n\n  \nB2;\nB3;"),
        ("c", "C1;"),
        ("d", ""),
    ]);
    let executor = Arc::new(RecordingExecutor::default());

    let report = coordinator::run_all(
        Arc::clone(&executor),
        Arc::new(fetcher),
        sources(&["a", "b", "c", "d"]),
    )
    .await;

    assert!(report.is_success());
    assert_eq!(report.error_message(), "");
    assert_eq!(report.outcomes().len(), 4);
    assert_eq!(report.statements_executed(), 6);
    assert_eq!(
        outcome_for(report.outcomes(), "b"),
        &RunOutcome::Succeeded {
            url: "b".into(),
            statements: 3
        }
    );
    assert_eq!(executor.executed().len(), 6);
}

/// Statements of one source run in line order even when sources interleave.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn per_source_order_is_preserved() {
    let fetcher = MemoryFetcher::with(&[
        ("a", "a1\na2\na3\na4\na5"),
        ("b", "b1\nb2\nb3\nb4\nb5"),
    ]);
    let executor = Arc::new(RecordingExecutor::default());

    let report =
        coordinator::run_all(Arc::clone(&executor), Arc::new(fetcher), sources(&["a", "b"])).await;
    assert!(report.is_success());

    let executed = executor.executed();
    for prefix in ["a", "b"] {
        let seen: Vec<&String> = executed.iter().filter(|s| s.starts_with(prefix)).collect();
        let expected: Vec<String> = (1..=5).map(|i| format!("{prefix}{i}")).collect();
        assert_eq!(seen, expected.iter().collect::<Vec<_>>());
    }
}

/// One source fails at its third line: its error appears exactly once and
/// the other sources still run to completion.
#[tokio::test]
async fn failing_source_is_reported_once_and_others_complete() {
    let fetcher = MemoryFetcher::with(&[
        ("a", "A1;\nA2;"),
        ("b", "B1;\nB2;\nBAD;\nB4;\nB5;"),
        ("c", "C1;\nC2;"),
        ("d", "D1;"),
    ]);
    let executor = Arc::new(RecordingExecutor {
        fail_on: vec!["BAD;"],
        ..Default::default()
    });

    let report = coordinator::run_all(
        Arc::clone(&executor),
        Arc::new(fetcher),
        sources(&["a", "b", "c", "d"]),
    )
    .await;

    assert!(!report.is_success());
    assert_eq!(report.outcomes().len(), 4);

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].url.url(), "b");
    assert_eq!(failures[0].kind, FailureKind::Exec);
    assert_eq!(failures[0].statement.as_ref().map(|s| s.line), Some(3));

    let message = report.error_message();
    assert_eq!(message.matches("rejected BAD;").count(), 1);

    let executed = executor.executed();
    assert!(executed.contains(&"B2;".to_string()));
    assert!(!executed.contains(&"B4;".to_string()));
    assert!(!executed.contains(&"B5;".to_string()));
    for done in ["A1;", "A2;", "C1;", "C2;", "D1;"] {
        assert!(executed.contains(&done.to_string()), "{done} should have run");
    }
}

/// Every failure kind is surfaced; none are discarded.
#[tokio::test]
async fn every_failure_is_collected() {
    let fetcher = MemoryFetcher::with(&[("a", "X;"), ("b", "OK;")]);
    let executor = Arc::new(RecordingExecutor {
        fail_on: vec!["X;"],
        ..Default::default()
    });

    let report = coordinator::run_all(
        executor,
        Arc::new(fetcher),
        sources(&["a", "b", "missing"]),
    )
    .await;

    assert_eq!(report.outcomes().len(), 3);
    assert_eq!(report.failures().count(), 2);
    assert_matches!(
        outcome_for(report.outcomes(), "missing"),
        RunOutcome::Failed(f) if f.kind == FailureKind::Fetch
    );
    assert_eq!(report.error_message().lines().count(), 2);
}

/// A runner that panics still yields exactly one outcome.
#[tokio::test]
async fn panicking_runner_reports_aborted() {
    let fetcher = MemoryFetcher::with(&[("a", "A1;\nBOOM;\nA3;"), ("b", "B1;")]);
    let executor = Arc::new(RecordingExecutor {
        panic_on: Some("BOOM;"),
        ..Default::default()
    });

    let report = coordinator::run_all(
        Arc::clone(&executor),
        Arc::new(fetcher),
        sources(&["a", "b"]),
    )
    .await;

    assert_eq!(report.outcomes().len(), 2);
    assert_matches!(
        outcome_for(report.outcomes(), "a"),
        RunOutcome::Failed(f) if f.kind == FailureKind::Aborted
    );
    assert_matches!(
        outcome_for(report.outcomes(), "b"),
        RunOutcome::Succeeded { statements: 1, .. }
    );
    assert!(!executor.executed().contains(&"A3;".to_string()));
}

/// Many sources: the bounded channel never deadlocks and yields N outcomes.
#[tokio::test]
async fn outcome_count_matches_source_count() {
    let urls: Vec<String> = (0..32).map(|i| format!("s{i}")).collect();
    let scripts: Vec<(&str, &str)> = urls.iter().map(|u| (u.as_str(), "Q;")).collect();
    let fetcher = MemoryFetcher::with(&scripts);

    let report = coordinator::run_all(
        Arc::new(RecordingExecutor::default()),
        Arc::new(fetcher),
        urls.iter().map(|u| ScriptSource::new(u.as_str())).collect(),
    )
    .await;

    assert_eq!(report.outcomes().len(), 32);
    assert!(report.is_success());
}

#[tokio::test]
async fn no_sources_yields_empty_report() {
    let report = coordinator::run_all(
        Arc::new(RecordingExecutor::default()),
        Arc::new(MemoryFetcher::default()),
        Vec::new(),
    )
    .await;
    assert!(report.outcomes().is_empty());
    assert!(report.is_success());
}

/// A connection failure aborts before any script is fetched.
#[tokio::test]
async fn connection_failure_launches_no_runners() {
    let config = ClusterConfig::new("127.0.0.1", 2).unwrap();
    let fetcher = Arc::new(MemoryFetcher::with(&[("a", "A1;")]));

    let result = coordinator::bootstrap(&config, Arc::clone(&fetcher), sources(&["a"])).await;

    assert_matches!(
        result,
        Err(ConnectionError::UnsupportedProtocolVersion { requested: 2 })
    );
    assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 0);
}

/// An unreachable cluster fails in the driver and no script is fetched.
#[tokio::test]
async fn unreachable_cluster_launches_no_runners() {
    let config = ClusterConfig::new("127.0.0.1:1", 4).unwrap();
    let fetcher = Arc::new(MemoryFetcher::with(&[("a", "A1;")]));

    let result = coordinator::bootstrap(&config, Arc::clone(&fetcher), sources(&["a"])).await;

    assert_matches!(result, Err(ConnectionError::Session(_)));
    assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 0);
}
