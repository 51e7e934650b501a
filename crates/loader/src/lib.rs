//! `cqlboot-loader` library crate.
//!
//! Re-exports internal modules for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod cli;
pub mod cluster;
pub mod coordinator;
pub mod fetcher;
pub mod runner;
