//! nfstress execution engine
//!
//! The bounded dispatcher and everything around it: job preparation,
//! the container-based remote executor, container liveness probes and
//! result reporting.

pub mod discovery;
pub mod dispatcher;
pub mod error;
pub mod job;
pub mod process;
pub mod report;

// Re-export main types
pub use discovery::{DockerProbe, StaticProbe};
pub use dispatcher::{ActiveGauge, ActiveSlot, DispatchOutcome, Dispatcher};
pub use error::ExecutionError;
pub use job::{JobFactory, PreparedJob, ScenarioJobFactory};
pub use process::{
    Capability, CommandOutput, CommandRunner, ContainerExecutor, ContainerExecutorConfig,
    TokioCommandRunner,
};
pub use report::{ConsoleReporter, LatencyStats, ResultSink, RunSummary};
