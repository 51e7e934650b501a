//! Immutable cluster connection settings.
//!
//! [`ClusterConfig`] is built once at startup from the raw flag values and
//! handed by reference to the connection builder. Consistency and timeout
//! are fixed for every run.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::error::CoreError;

/// Port appended to contact points that do not name one.
pub const DEFAULT_CQL_PORT: u16 = 9042;

/// Connection timeout applied to the cluster session.
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Default value of the `--cassandra-hosts` flag.
pub const DEFAULT_HOSTS: &str = "127.0.0.1";

/// Default value of the `--cassandra-protocol-version` flag.
pub const DEFAULT_PROTOCOL_VERSION: u8 = 4;

/// Consistency level every bootstrap statement is executed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consistency {
    /// A majority of replicas must acknowledge.
    Quorum,
}

/// Consistency level applied through the session's default profile.
pub const CONSISTENCY: Consistency = Consistency::Quorum;

/// Settings for a single cluster session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    hosts: Vec<String>,
    protocol_version: u8,
}

impl ClusterConfig {
    /// Build a config from a comma-separated host list and a protocol version.
    ///
    /// Hosts are trimmed and empty entries dropped. Fails if no host remains
    /// or the protocol version is zero.
    pub fn new(hosts_csv: &str, protocol_version: u8) -> Result<Self, CoreError> {
        let hosts: Vec<String> = hosts_csv
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if hosts.is_empty() {
            return Err(CoreError::Validation(format!(
                "no cassandra hosts in '{hosts_csv}'"
            )));
        }

        if protocol_version == 0 {
            return Err(CoreError::Validation(
                "protocol version must be positive".to_string(),
            ));
        }

        Ok(Self {
            hosts,
            protocol_version,
        })
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn protocol_version(&self) -> u8 {
        self.protocol_version
    }

    pub fn consistency(&self) -> Consistency {
        CONSISTENCY
    }

    pub fn timeout(&self) -> Duration {
        CONNECTION_TIMEOUT
    }

    /// Hosts rendered as `host:port` contact points.
    ///
    /// Entries without a port get [`DEFAULT_CQL_PORT`]; bare IPv6 literals
    /// are bracketed.
    pub fn contact_points(&self) -> Vec<String> {
        self.hosts.iter().map(|h| contact_point(h)).collect()
    }
}

fn contact_point(host: &str) -> String {
    if host.parse::<SocketAddr>().is_ok() {
        return host.to_string();
    }
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V6(ip)) => format!("[{ip}]:{DEFAULT_CQL_PORT}"),
        Ok(IpAddr::V4(ip)) => format!("{ip}:{DEFAULT_CQL_PORT}"),
        Err(_) if host.contains(':') => host.to_string(),
        Err(_) => format!("{host}:{DEFAULT_CQL_PORT}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
