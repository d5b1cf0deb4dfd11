//! Interfaces to the external collaborators of the dispatcher
//!
//! The dispatcher only ever talks to these traits, so the container-based
//! executor, the direct HTTP executor and test doubles are interchangeable.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;
use crate::outcome::ExecStatus;
use crate::payload::RequestPayload;

/// Issues one request from a given execution context
///
/// Implementations own the timeout: a request that does not finish within
/// `timeout` must come back as `ExecStatus::Failed(FailureReason::Timeout)`,
/// never as an indefinite hang. Errors are folded into the status; this call
/// cannot fail the run.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Execute `payload` from `context` and report what happened
    ///
    /// # Arguments
    /// * `context` - Execution context (container name) issuing the call
    /// * `payload` - The fully-built request
    /// * `timeout` - Upper bound for the whole call
    async fn execute(
        &self,
        context: &str,
        payload: &RequestPayload,
        timeout: Duration,
    ) -> ExecStatus;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Reports which execution contexts are currently reachable
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Filter `candidates` down to the reachable ones, preserving order
    async fn list_available(&self, candidates: &[String]) -> Result<Vec<String>>;
}
