//! `nfstress config` subcommands

use anyhow::{anyhow, Context, Result};
use nfstress_config::{ConfigLoader, StressConfig};
use std::path::Path;
use tracing::{error, info};

/// Load a configuration file with environment overrides and report the result
pub fn handle_config_validate(config_file: &Path) -> Result<()> {
    info!("Validating configuration file: {:?}", config_file);

    if !config_file.exists() {
        return Err(anyhow!("Configuration file not found: {:?}", config_file));
    }

    match ConfigLoader::new().from_file(config_file) {
        Ok(_) => {
            println!("✅ Configuration file is valid");
            Ok(())
        }
        Err(e) => {
            println!("❌ Configuration validation failed: {}", e);
            error!("Configuration validation failed: {}", e);
            Err(e).context("Invalid configuration file")
        }
    }
}

/// Render the effective configuration
pub fn render_config(config: &StressConfig, format: &str) -> Result<String> {
    let rendered = match format.to_lowercase().as_str() {
        "yaml" | "yml" => config.to_yaml().context("Failed to serialize to YAML")?,
        "json" => config.to_json().context("Failed to serialize to JSON")?,
        _ => {
            return Err(anyhow!(
                "Unknown output format: {}. Valid formats: yaml, json",
                format
            ))
        }
    };
    Ok(rendered)
}

pub fn handle_config_show(config: &StressConfig, format: &str) -> Result<()> {
    println!("{}", render_config(config, format)?);
    Ok(())
}

pub fn handle_config_sample() -> Result<()> {
    println!("{}", StressConfig::generate_sample());
    Ok(())
}
