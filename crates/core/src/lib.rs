//! Pure domain logic for the CQL schema bootstrapper.
//!
//! Nothing in this crate touches the network; connection handling, HTTP and
//! task orchestration live in `cqlboot-loader`.

pub mod config;
pub mod error;
pub mod outcome;
pub mod script;

pub use config::ClusterConfig;
pub use error::CoreError;
pub use outcome::{BootstrapReport, FailureKind, RunFailure, RunOutcome};
pub use script::{script_lines, ScriptLine, ScriptSource};
