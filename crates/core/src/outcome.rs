//! Per-source run outcomes and their aggregation.
//!
//! Each runner emits exactly one [`RunOutcome`]. The coordinator collects
//! them into a [`BootstrapReport`], which renders the newline-joined error
//! text shown on a failed run.

use std::fmt;

use crate::script::ScriptSource;

/// Stage at which a source failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The HTTP request failed or returned a non-success status.
    Fetch,
    /// The response body could not be read.
    Read,
    /// A statement was rejected by the cluster.
    Exec,
    /// The runner stopped without reporting (e.g. it panicked).
    Aborted,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fetch => "fetch",
            Self::Read => "read",
            Self::Exec => "exec",
            Self::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// Statement that failed, for [`FailureKind::Exec`] failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedStatement {
    pub line: usize,
    pub statement: String,
}

/// Structured failure record for one source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{url}: {kind} error: {message}")]
pub struct RunFailure {
    pub url: ScriptSource,
    pub kind: FailureKind,
    pub message: String,
    pub statement: Option<FailedStatement>,
}

impl RunFailure {
    pub fn new(url: ScriptSource, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            url,
            kind,
            message: message.into(),
            statement: None,
        }
    }

    pub fn exec(
        url: ScriptSource,
        line: usize,
        statement: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            url,
            kind: FailureKind::Exec,
            message: format!("line {line} `{statement}`: {}", message.into()),
            statement: Some(FailedStatement {
                line,
                statement: statement.to_string(),
            }),
        }
    }
}

/// Result of running one source to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded {
        url: ScriptSource,
        statements: usize,
    },
    Failed(RunFailure),
}

impl RunOutcome {
    pub fn url(&self) -> &ScriptSource {
        match self {
            Self::Succeeded { url, .. } => url,
            Self::Failed(failure) => &failure.url,
        }
    }

    pub fn failure(&self) -> Option<&RunFailure> {
        match self {
            Self::Succeeded { .. } => None,
            Self::Failed(failure) => Some(failure),
        }
    }
}

impl From<RunFailure> for RunOutcome {
    fn from(failure: RunFailure) -> Self {
        Self::Failed(failure)
    }
}

/// Every outcome received by the coordinator, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    outcomes: Vec<RunOutcome>,
}

impl BootstrapReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: RunOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[RunOutcome] {
        &self.outcomes
    }

    pub fn failures(&self) -> impl Iterator<Item = &RunFailure> {
        self.outcomes.iter().filter_map(RunOutcome::failure)
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Total statements executed by sources that succeeded.
    pub fn statements_executed(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o {
                RunOutcome::Succeeded { statements, .. } => *statements,
                RunOutcome::Failed(_) => 0,
            })
            .sum()
    }

    /// All failure messages, one per line. Empty when every source succeeded.
    pub fn error_message(&self) -> String {
        self.failures().map(|f| format!("{f}\n")).collect()
    }
}

impl FromIterator<RunOutcome> for BootstrapReport {
    fn from_iter<I: IntoIterator<Item = RunOutcome>>(iter: I) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
