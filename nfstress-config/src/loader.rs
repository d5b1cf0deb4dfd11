//! Configuration loading and environment variable handling

use crate::domains::StressConfig;
use crate::error::{ConfigError, ConfigResult};
use nfstress_core::NfKind;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Configuration loader with environment variable support
///
/// Layers, lowest to highest precedence: built-in defaults, an optional
/// YAML file, then `<PREFIX>_*` environment variables. Command-line flags
/// are applied by the caller afterwards.
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "NFSTRESS".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<StressConfig> {
        let content = std::fs::read_to_string(path)?;
        let mut config: StressConfig = serde_yaml::from_str(&content)?;

        // Apply environment variable overrides
        self.apply_env_overrides(&mut config)?;

        // Validate all domains
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<StressConfig> {
        let mut config = StressConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<StressConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut StressConfig) -> ConfigResult<()> {
        self.apply_run_overrides(&mut config.run)?;
        self.apply_identity_overrides(&mut config.identity)?;
        self.apply_endpoint_overrides(&mut config.endpoints);
        self.apply_executor_overrides(&mut config.executor)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    /// Apply run overrides
    fn apply_run_overrides(
        &self,
        config: &mut crate::domains::run::RunDefaults,
    ) -> ConfigResult<()> {
        if let Some(mode) = self.parse_var::<nfstress_core::RunMode>("MODE")? {
            config.mode = mode;
        }
        if let Some(concurrency) = self.parse_var("CONCURRENCY")? {
            config.concurrency = concurrency;
        }
        if let Some(pacing) = self.parse_var::<u64>("PACE_MS")? {
            config.pacing = Duration::from_millis(pacing);
        }
        if let Some(seed) = self.parse_var("SEED")? {
            config.seed = Some(seed);
        }
        if let Some(format) = self.parse_var("REPORT_FORMAT")? {
            config.report_format = format;
        }
        Ok(())
    }

    /// Apply identity overrides
    fn apply_identity_overrides(
        &self,
        config: &mut crate::domains::identity::IdentityConfig,
    ) -> ConfigResult<()> {
        if let Some(start) = self.parse_var("IMSI_START")? {
            config.imsi_start = start;
        }
        if let Some(end) = self.parse_var("IMSI_END")? {
            config.imsi_end = end;
        }
        if let Some(width) = self.parse_var("IMSI_WIDTH")? {
            config.imsi_width = width;
        }
        if let Ok(mcc) = self.get_env_var("MCC") {
            config.mcc = mcc;
        }
        if let Ok(mnc) = self.get_env_var("MNC") {
            config.mnc = mnc;
        }
        if let Ok(nf_ipv4) = self.get_env_var("NF_IPV4") {
            config.nf_ipv4 = nf_ipv4;
        }
        Ok(())
    }

    /// Apply `<PREFIX>_<KIND>_URL` overrides for every known NF kind
    fn apply_endpoint_overrides(&self, config: &mut crate::domains::endpoints::EndpointsConfig) {
        for kind in NfKind::known() {
            if let Ok(url) = self.get_env_var(&format!("{}_URL", kind.as_str())) {
                if let Some(base) = config.base_mut(kind) {
                    *base = url;
                }
            }
        }
    }

    /// Apply executor overrides
    fn apply_executor_overrides(
        &self,
        config: &mut crate::domains::executor::ExecutorConfig,
    ) -> ConfigResult<()> {
        if let Some(backend) = self.parse_var("EXECUTOR")? {
            config.backend = backend;
        }
        if let Some(seconds) = self.parse_var::<u64>("REQUEST_TIMEOUT")? {
            config.request_timeout = Duration::from_secs(seconds);
        }
        if let Ok(value) = self.get_env_var("AUTO_PROVISION") {
            config.auto_provision = parse_flag(&value).ok_or_else(|| {
                ConfigError::EnvError(format!("Invalid AUTO_PROVISION: {}", value))
            })?;
        }
        if let Ok(binary) = self.get_env_var("DOCKER_BINARY") {
            config.docker_binary = binary;
        }
        if let Ok(value) = self.get_env_var("HTTP2_PRIOR_KNOWLEDGE") {
            config.http2_prior_knowledge = parse_flag(&value).ok_or_else(|| {
                ConfigError::EnvError(format!("Invalid HTTP2_PRIOR_KNOWLEDGE: {}", value))
            })?;
        }
        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Some(level) = self.parse_var("LOG_LEVEL")? {
            config.level = level;
        }
        if let Some(format) = self.parse_var("LOG_FORMAT")? {
            config.format = format;
        }
        Ok(())
    }

    /// Read and parse `<PREFIX>_<name>`; unset yields `None`
    fn parse_var<T>(&self, name: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_env_var(name) {
            Ok(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| ConfigError::EnvError(format!("Invalid {}: {}", name, e))),
            Err(_) => Ok(None),
        }
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Accepts the usual shell spellings of a boolean
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
