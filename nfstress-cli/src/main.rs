use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use nfstress_config::{ConfigError, ConfigLoader, StressConfig};
use nfstress_logging::{init_logging_from_config, init_simple_tracing};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

mod cli;
mod commands;

use cli::{Cli, Commands, ConfigCommands};

/// Load configuration from file or use defaults, with environment overrides
fn load_config(config_path: Option<&PathBuf>) -> Result<StressConfig> {
    let loader = ConfigLoader::new();

    match config_path {
        Some(path) => {
            if !path.exists() {
                return Err(anyhow::anyhow!(
                    "Configuration file not found: {:?}",
                    path
                ));
            }
            loader
                .from_file(path)
                .context(format!("Failed to load configuration from {:?}", path))
        }
        None => loader
            .from_env()
            .context("Failed to load configuration from environment"),
    }
}

/// Exit status for a run aborted by a second Ctrl-C (128 + SIGINT)
const INTERRUPTED_EXIT: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    /// Stop dispatching and let in-flight jobs finish
    Drain,
    /// Give up on the drain and leave immediately
    Exit,
}

fn interrupt_action(presses: usize) -> Interrupt {
    if presses <= 1 {
        Interrupt::Drain
    } else {
        Interrupt::Exit
    }
}

/// Cancel `token` on the first Ctrl-C so in-flight jobs drain and get
/// reported; a second Ctrl-C exits without waiting for them.
fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        let mut presses = 0;
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                debug!("Cannot listen for Ctrl-C: {}", e);
                return;
            }
            presses += 1;
            match interrupt_action(presses) {
                Interrupt::Drain => {
                    warn!(
                        "Interrupted, waiting for in-flight requests to finish (Ctrl-C again to quit)"
                    );
                    token.cancel();
                }
                Interrupt::Exit => {
                    warn!("Interrupted again, exiting without waiting");
                    std::process::exit(INTERRUPTED_EXIT);
                }
            }
        }
    });
}

/// Usage line for the subcommand that was invoked, or the top-level one
fn usage(subcommand: Option<&str>) -> String {
    let mut command = Cli::command();
    command.build();
    match subcommand.and_then(|name| command.find_subcommand_mut(name)) {
        Some(sub) => sub.render_usage().to_string(),
        None => command.render_usage().to_string(),
    }
}

fn subcommand_name(command: &Commands) -> &'static str {
    match command {
        Commands::AuthVectors(_) => "auth-vectors",
        Commands::Discovery(_) => "discovery",
        Commands::Register(_) => "register",
        Commands::SubscriberQuery(_) => "subscriber-query",
        Commands::Config { .. } => "config",
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Config {
        config_cmd: ConfigCommands::Validate { config_file },
    } = &cli.command
    {
        init_simple_tracing(cli.log_level.unwrap_or_default().as_str())?;
        return commands::config::handle_config_validate(config_file);
    }

    let mut config = load_config(cli.config.as_ref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    match &cli.command {
        Commands::Config { config_cmd } => {
            init_logging_from_config(&config.logging)?;
            match config_cmd {
                ConfigCommands::Show { format } => {
                    commands::config::handle_config_show(&config, format)
                }
                ConfigCommands::Sample => commands::config::handle_config_sample(),
                ConfigCommands::Validate { config_file } => {
                    commands::config::handle_config_validate(config_file)
                }
            }
        }
        command => {
            let Some((scenario, args)) = command.scenario() else {
                return Ok(());
            };

            commands::run::apply_overrides(&mut config, args)
                .context("Invalid command-line options")?;
            init_logging_from_config(&config.logging)?;
            info!("nfstress {} starting", env!("CARGO_PKG_VERSION"));

            let cancel = CancellationToken::new();
            cancel_on_interrupt(cancel.clone());

            let summary = commands::run::run_scenario(scenario, args, &config, cancel).await?;
            if summary.cancelled {
                warn!(
                    "Run interrupted: {} of {} requests completed",
                    summary.total, summary.planned
                );
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version print to stdout and succeed
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let subcommand = subcommand_name(&cli.command);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if e.downcast_ref::<ConfigError>().is_some() {
                eprintln!("{}", usage(Some(subcommand)));
            }
            ExitCode::FAILURE
        }
    }
}
