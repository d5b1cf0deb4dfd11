//! Domain-driven configuration management for nfstress
//!
//! Configuration is split by functional domain (run, identity, endpoints,
//! executor, logging). Each domain carries its own defaults and validation;
//! [`ConfigLoader`] layers a YAML file and `NFSTRESS_*` environment
//! variables on top of the defaults.

pub mod domains;
pub mod error;
pub mod loader;
pub mod validation;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use validation::Validatable;

// Re-export domain configurations
pub use domains::{
    endpoints::EndpointsConfig,
    executor::{ExecutorBackend, ExecutorConfig},
    identity::IdentityConfig,
    logging::{LogFormat, LogLevel, LoggingConfig},
    run::{ReportFormat, RunConfig, RunDefaults},
    StressConfig,
};

// Re-export utilities
pub use domains::utils::{serde_duration, serde_duration_ms};
