//! `cqlboot-loader` -- Cassandra schema bootstrapper.
//!
//! Downloads the fixed set of service CQL scripts and runs every line of
//! each one against the cluster, one concurrent runner per script. Exits
//! non-zero if the cluster cannot be reached or any script fails.
//!
//! # Flags
//!
//! | Flag                           | Env var                      | Default     |
//! |--------------------------------|------------------------------|-------------|
//! | `--cassandra-hosts`            | `CASSANDRA_HOSTS`            | `127.0.0.1` |
//! | `--cassandra-protocol-version` | `CASSANDRA_PROTOCOL_VERSION` | `4`         |

use std::sync::Arc;

use clap::Parser;
use cqlboot_core::ScriptSource;
use cqlboot_loader::cli::Cli;
use cqlboot_loader::cluster::ConnectionError;
use cqlboot_loader::coordinator;
use cqlboot_loader::fetcher::HttpFetcher;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cqlboot_loader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = cli
        .cluster_config()
        .map_err(ConnectionError::from)
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Cannot build cluster configuration");
            std::process::exit(1);
        });

    let sources = ScriptSource::defaults();
    let fetcher = Arc::new(HttpFetcher::new());

    let report = coordinator::bootstrap(&config, fetcher, sources)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Cannot connect to cassandra cluster");
            std::process::exit(1);
        });

    if !report.is_success() {
        tracing::error!(
            failed = report.failures().count(),
            "Schema bootstrap failed:\n{}",
            report.error_message(),
        );
        std::process::exit(1);
    }

    tracing::debug!(
        sources = report.outcomes().len(),
        statements = report.statements_executed(),
        "Schema bootstrap complete",
    );
}
