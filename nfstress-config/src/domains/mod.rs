//! Domain-specific configuration modules

pub mod endpoints;
pub mod executor;
pub mod identity;
pub mod logging;
pub mod run;
pub mod utils;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main nfstress configuration combining all domains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StressConfig {
    /// Scheduling defaults
    #[serde(default)]
    pub run: run::RunDefaults,

    /// IMSI range and PLMN identifiers
    #[serde(default)]
    pub identity: identity::IdentityConfig,

    /// NF base URLs
    #[serde(default)]
    pub endpoints: endpoints::EndpointsConfig,

    /// Remote executor
    #[serde(default)]
    pub executor: executor::ExecutorConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl StressConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.run.validate()?;
        self.identity.validate()?;
        self.endpoints.validate()?;
        self.executor.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Render the configuration as YAML
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Render the configuration as pretty JSON
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        StressConfig::default()
            .to_yaml()
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}
