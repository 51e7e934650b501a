//! Per-source script runner.
//!
//! A runner fetches one script, splits it into statements and executes them
//! in line order against the shared session, stopping at the first failure.
//! Whatever happens, it yields exactly one [`RunOutcome`].

use std::future::Future;

use cqlboot_core::{script_lines, RunFailure, RunOutcome, ScriptSource};

use crate::fetcher::FetchError;

/// Something that can execute a single CQL statement.
///
/// Implementations must be safe to share between concurrently running
/// sources; no exclusive lock is taken around `execute`.
pub trait StatementExecutor: Send + Sync {
    type Error: std::fmt::Display + Send;

    fn execute(&self, statement: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Retrieves the text of a remote script.
pub trait ScriptFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Fetch and execute one script source.
pub async fn run_source<E, F>(executor: &E, fetcher: &F, source: &ScriptSource) -> RunOutcome
where
    E: StatementExecutor,
    F: ScriptFetcher,
{
    tracing::info!(url = %source, "Fetching script");

    let body = match fetcher.fetch(source.url()).await {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(url = %source, error = %e, "Failed to fetch script");
            return RunFailure::new(source.clone(), e.kind(), e.to_string()).into();
        }
    };

    tracing::debug!(url = %source, bytes = body.len(), "Script downloaded");

    let mut executed = 0;
    for line in script_lines(&body) {
        tracing::info!(
            url = %source,
            line = line.number,
            statement = line.statement,
            "Running command",
        );

        if let Err(e) = executor.execute(line.statement).await {
            tracing::error!(
                url = %source,
                line = line.number,
                error = %e,
                "Statement failed, skipping the rest of the script",
            );
            return RunFailure::exec(source.clone(), line.number, line.statement, e.to_string())
                .into();
        }
        executed += 1;
    }

    tracing::info!(url = %source, statements = executed, "Script applied");

    RunOutcome::Succeeded {
        url: source.clone(),
        statements: executed,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
