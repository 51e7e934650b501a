//! Fan-out of one runner per script source and collection of their outcomes.
//!
//! Each runner task owns a [`ReportGuard`] wrapping a clone of the sender of
//! a channel bounded to the number of sources. The channel closes once the
//! last guard is gone, so draining it yields exactly one outcome per source.

use std::sync::Arc;

use cqlboot_core::{
    BootstrapReport, ClusterConfig, FailureKind, RunFailure, RunOutcome, ScriptSource,
};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::cluster::{self, ConnectionError};
use crate::runner::{self, ScriptFetcher, StatementExecutor};

/// Delivers a runner's single outcome.
///
/// Dropping the guard without calling [`ReportGuard::report`] sends an
/// [`FailureKind::Aborted`] failure instead, so a panicking or cancelled
/// runner is still accounted for.
struct ReportGuard {
    source: ScriptSource,
    tx: Option<mpsc::Sender<RunOutcome>>,
}

impl ReportGuard {
    fn new(source: ScriptSource, tx: mpsc::Sender<RunOutcome>) -> Self {
        Self {
            source,
            tx: Some(tx),
        }
    }

    fn report(mut self, outcome: RunOutcome) {
        if let Some(tx) = self.tx.take() {
            send(&tx, outcome);
        }
    }
}

impl Drop for ReportGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let failure = RunFailure::new(
                self.source.clone(),
                FailureKind::Aborted,
                "runner stopped before reporting an outcome",
            );
            send(&tx, failure.into());
        }
    }
}

// The channel holds one slot per source and each guard sends at most once,
// so `try_send` can only fail if the coordinator stopped listening.
fn send(tx: &mpsc::Sender<RunOutcome>, outcome: RunOutcome) {
    if let Err(e) = tx.try_send(outcome) {
        tracing::warn!(error = %e, "Dropping run outcome, coordinator is gone");
    }
}

/// Run every source concurrently against a shared executor and collect one
/// outcome per source.
pub async fn run_all<E, F>(
    executor: Arc<E>,
    fetcher: Arc<F>,
    sources: Vec<ScriptSource>,
) -> BootstrapReport
where
    E: StatementExecutor + 'static,
    F: ScriptFetcher + 'static,
{
    if sources.is_empty() {
        return BootstrapReport::new();
    }

    let (tx, mut rx) = mpsc::channel(sources.len());
    let mut tasks = JoinSet::new();

    for source in sources {
        let guard = ReportGuard::new(source.clone(), tx.clone());
        let executor = Arc::clone(&executor);
        let fetcher = Arc::clone(&fetcher);

        tasks.spawn(async move {
            let outcome = runner::run_source(&*executor, &*fetcher, &source).await;
            guard.report(outcome);
        });
    }
    drop(tx);

    let mut report = BootstrapReport::new();
    while let Some(outcome) = rx.recv().await {
        report.record(outcome);
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "Runner task did not complete");
        }
    }

    report
}

/// Connect to the cluster and apply every source.
///
/// A connection failure is returned before any source is fetched. The
/// session is released before this returns.
pub async fn bootstrap<F>(
    config: &ClusterConfig,
    fetcher: Arc<F>,
    sources: Vec<ScriptSource>,
) -> Result<BootstrapReport, ConnectionError>
where
    F: ScriptFetcher + 'static,
{
    let session = Arc::new(cluster::connect(config).await?);
    let report = run_all(Arc::clone(&session), fetcher, sources).await;
    drop(session);
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
