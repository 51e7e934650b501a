//! Cluster session construction.
//!
//! Builds a `scylla` session from a [`ClusterConfig`]: every statement runs
//! at the config's consistency level through the default execution profile,
//! and the fixed timeout bounds both connection setup and requests.

use cqlboot_core::config::Consistency;
use cqlboot_core::{ClusterConfig, CoreError};
use scylla::client::execution_profile::ExecutionProfile;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::errors::{ExecutionError, NewSessionError};
use scylla::statement::Consistency as CqlConsistency;

use crate::runner::StatementExecutor;

/// Native protocol version negotiated by the driver.
pub const SUPPORTED_PROTOCOL_VERSION: u8 = 4;

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Invalid cluster configuration: {0}")]
    InvalidConfig(#[from] CoreError),

    #[error("Unsupported CQL protocol version {requested}: only v4 is supported")]
    UnsupportedProtocolVersion { requested: u8 },

    #[error("Failed to create cluster session: {0}")]
    Session(#[from] NewSessionError),
}

/// Live session shared by all runners.
pub struct CqlSession {
    session: Session,
}

impl StatementExecutor for CqlSession {
    type Error = ExecutionError;

    async fn execute(&self, statement: &str) -> Result<(), ExecutionError> {
        self.session.query_unpaged(statement, ()).await?;
        Ok(())
    }
}

fn cql_consistency(consistency: Consistency) -> CqlConsistency {
    match consistency {
        Consistency::Quorum => CqlConsistency::Quorum,
    }
}

/// Reject settings the driver cannot honour, before touching the network.
pub fn check_supported(config: &ClusterConfig) -> Result<(), ConnectionError> {
    if config.protocol_version() != SUPPORTED_PROTOCOL_VERSION {
        return Err(ConnectionError::UnsupportedProtocolVersion {
            requested: config.protocol_version(),
        });
    }
    Ok(())
}

/// Open a session to the cluster. No retries.
pub async fn connect(config: &ClusterConfig) -> Result<CqlSession, ConnectionError> {
    check_supported(config)?;

    let contact_points = config.contact_points();
    tracing::info!(
        contact_points = ?contact_points,
        protocol_version = config.protocol_version(),
        "Connecting to cassandra cluster",
    );

    let profile = ExecutionProfile::builder()
        .consistency(cql_consistency(config.consistency()))
        .request_timeout(Some(config.timeout()))
        .build();

    let session = SessionBuilder::new()
        .known_nodes(&contact_points)
        .connection_timeout(config.timeout())
        .default_execution_profile_handle(profile.into_handle())
        .build()
        .await?;

    tracing::info!("Cluster session established");

    Ok(CqlSession { session })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
