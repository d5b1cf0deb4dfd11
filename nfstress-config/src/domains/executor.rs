//! Remote executor configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, Validatable};

/// Which adapter issues the requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorBackend {
    /// `curl` inside the sender container via `docker exec`
    #[default]
    Docker,
    /// Direct HTTP from the host
    Http,
}

impl FromStr for ExecutorBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "docker" | "container" => Ok(ExecutorBackend::Docker),
            "http" => Ok(ExecutorBackend::Http),
            _ => Err(format!("Invalid executor backend: {}", s)),
        }
    }
}

impl fmt::Display for ExecutorBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutorBackend::Docker => write!(f, "docker"),
            ExecutorBackend::Http => write!(f, "http"),
        }
    }
}

/// Executor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub backend: ExecutorBackend,

    /// Upper bound for one request, in seconds
    #[serde(with = "crate::domains::utils::serde_duration")]
    pub request_timeout: Duration,

    /// Extra wall-clock allowance for process start-up, in milliseconds
    #[serde(with = "crate::domains::utils::serde_duration_ms")]
    pub timeout_grace: Duration,

    /// Install curl in sender containers that lack it
    #[serde(default = "crate::domains::utils::default_false")]
    pub auto_provision: bool,

    /// Container runtime binary
    pub docker_binary: String,

    /// Speak HTTP/2 without upgrade negotiation
    #[serde(default = "crate::domains::utils::default_false")]
    pub http2_prior_knowledge: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            backend: ExecutorBackend::Docker,
            request_timeout: Duration::from_secs(5),
            timeout_grace: Duration::from_millis(2000),
            auto_provision: false,
            docker_binary: "docker".to_string(),
            http2_prior_knowledge: false,
        }
    }
}

impl Validatable for ExecutorConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(
            self.request_timeout.as_secs(),
            "request_timeout",
            self.domain_name(),
        )?;

        if self.request_timeout > Duration::from_secs(300) {
            return Err(self.validation_error("request_timeout cannot exceed 300 seconds"));
        }

        if self.backend == ExecutorBackend::Docker {
            validate_required_string(&self.docker_binary, "docker_binary", self.domain_name())?;
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "executor"
    }
}
