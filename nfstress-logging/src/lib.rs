//! Logging initialisation for nfstress
//!
//! Diagnostics go through `tracing` and are written to stderr, so stdout
//! carries only per-job report lines and the run summary.

pub mod init;

pub use init::{build_env_filter, init_logging_from_config, init_simple_tracing};
