//! Direct HTTP execution for nfstress
//!
//! [`HttpExecutor`] issues synthesized requests from the host with reqwest,
//! for cores whose SBI endpoints are reachable without entering an NF
//! container. The sender context is kept only as a report label.

pub mod client;
pub mod config;
pub mod errors;
pub mod types;

// Re-export main types for convenience
pub use client::HttpExecutor;
pub use config::HttpExecutorConfig;
pub use errors::HttpError;
pub use types::{header_map, to_reqwest_method};
