//! Run configuration: scheduling mode, concurrency ceiling and pacing

use nfstress_core::{DrawOrder, RunMode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};
use crate::validation::{validate_positive, Validatable};

/// Upper bound for the concurrency ceiling
pub const MAX_CONCURRENCY: usize = 1024;

/// Run defaults as they appear in the `run` section of the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunDefaults {
    /// Scheduling mode
    pub mode: RunMode,

    /// Maximum outstanding jobs in parallel mode
    pub concurrency: usize,

    /// Delay between jobs in sequential mode, in milliseconds
    #[serde(with = "crate::domains::utils::serde_duration_ms")]
    pub pacing: Duration,

    /// Seed for the identifier and target stream
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Per-job output format
    pub report_format: ReportFormat,

    /// How identifiers are taken from the range
    pub draw_order: DrawOrder,
}

impl Default for RunDefaults {
    fn default() -> Self {
        Self {
            mode: RunMode::Sequential,
            concurrency: 4,
            pacing: Duration::from_millis(100),
            seed: None,
            report_format: ReportFormat::Text,
            draw_order: DrawOrder::Random,
        }
    }
}

impl Validatable for RunDefaults {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.concurrency, "concurrency", self.domain_name())?;

        if self.concurrency > MAX_CONCURRENCY {
            return Err(self.validation_error(format!(
                "concurrency must be at most {}, got {}",
                MAX_CONCURRENCY, self.concurrency
            )));
        }

        if self.pacing > Duration::from_secs(60) {
            log::warn!(
                "run.pacing of {}ms will make sequential runs very slow",
                self.pacing.as_millis()
            );
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "run"
    }
}

/// Per-job output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// `[i/N] OUTCOME key=value ...`
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!("Invalid report format: {}", s)),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

/// The validated, immutable parameters of one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub total_requests: usize,
    pub mode: RunMode,
    pub concurrency: usize,
    pub pacing: Duration,
    pub seed: Option<u64>,
    pub report_format: ReportFormat,
    pub draw_order: DrawOrder,
}

impl RunConfig {
    /// Combine a request count with the run defaults and validate the result
    pub fn new(total_requests: usize, defaults: &RunDefaults) -> ConfigResult<Self> {
        let config = Self {
            total_requests,
            mode: defaults.mode,
            concurrency: defaults.concurrency,
            pacing: defaults.pacing,
            seed: defaults.seed,
            report_format: defaults.report_format,
            draw_order: defaults.draw_order,
        };
        config.validate()?;
        Ok(config)
    }

    /// Number of jobs allowed in flight at once for this mode
    pub fn effective_concurrency(&self) -> usize {
        match self.mode {
            RunMode::Sequential => 1,
            RunMode::Parallel => self.concurrency,
        }
    }
}

impl Validatable for RunConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.total_requests == 0 {
            return Err(ConfigError::ValidationError(
                "NUM_REQUESTS must be a positive integer".to_string(),
            ));
        }
        validate_positive(self.concurrency, "concurrency", self.domain_name())?;
        if self.concurrency > MAX_CONCURRENCY {
            return Err(self.validation_error(format!(
                "concurrency must be at most {}, got {}",
                MAX_CONCURRENCY, self.concurrency
            )));
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "run"
    }
}
