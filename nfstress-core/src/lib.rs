//! Core domain models and types for nfstress
//!
//! This crate contains the fundamental types used throughout the load
//! generator: NF kinds and scenarios, identifier ranges, request synthesis,
//! target selection and the typed job outcome model. It performs no I/O.

pub mod error;
pub mod executor;
pub mod identifier;
pub mod outcome;
pub mod payload;
pub mod target;
pub mod types;

// Re-export commonly used types at the crate root
pub use error::{CoreError, Result};
pub use executor::{LivenessProbe, RemoteExecutor};
pub use identifier::{DrawOrder, IdentifierRange, IdentifierSource};
pub use outcome::{classify, ExecStatus, FailureReason, JobResult, JobSpec, Outcome};
pub use payload::{
    random_uuid, EndpointMap, JobDraw, PayloadSynthesizer, RequestPayload, TemplateParams,
};
pub use target::{CandidateSet, Selection, TargetSelector};
pub use types::{HttpMethod, NfKind, ParseError, RunMode, Scenario};
