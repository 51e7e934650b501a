//! Command-line flags.
//!
//! Each flag falls back to an environment variable (which may come from a
//! `.env` file) and then to its default.

use clap::Parser;
use cqlboot_core::config::{DEFAULT_HOSTS, DEFAULT_PROTOCOL_VERSION};
use cqlboot_core::{ClusterConfig, CoreError};

#[derive(Debug, Parser)]
#[command(
    name = "cqlboot-loader",
    about = "Apply the bootstrap CQL schema scripts to a Cassandra cluster"
)]
pub struct Cli {
    /// The list of cassandra hosts to connect to, comma separated.
    #[arg(long, env = "CASSANDRA_HOSTS", default_value = DEFAULT_HOSTS)]
    pub cassandra_hosts: String,

    /// The cassandra native protocol version. Only 4 is supported by the
    /// driver; any other value fails before connecting.
    #[arg(
        long,
        alias = "cassandra-protocl-version",
        env = "CASSANDRA_PROTOCOL_VERSION",
        default_value_t = DEFAULT_PROTOCOL_VERSION
    )]
    pub cassandra_protocol_version: u8,
}

impl Cli {
    pub fn cluster_config(&self) -> Result<ClusterConfig, CoreError> {
        ClusterConfig::new(&self.cassandra_hosts, self.cassandra_protocol_version)
    }
}
