//! CLI argument parsing definitions

use clap::{Args, Parser, Subcommand};
use nfstress_config::{ExecutorBackend, LogFormat, LogLevel, ReportFormat};
use nfstress_core::{NfKind, RunMode, Scenario};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Set the log format (text, json, compact)
    #[arg(long, value_name = "FORMAT", global = true)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate authentication vectors through UDM (sent from AUSF)
    AuthVectors(ScenarioArgs),

    /// Query the NRF for NF instances of a target kind
    Discovery(ScenarioArgs),

    /// Register synthetic NF profiles with the NRF
    Register(ScenarioArgs),

    /// Query subscriber data from UDR (sent from UDM)
    SubscriberQuery(ScenarioArgs),

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

impl Commands {
    /// The scenario a run subcommand drives, with its arguments
    pub fn scenario(&self) -> Option<(Scenario, &ScenarioArgs)> {
        match self {
            Commands::AuthVectors(args) => Some((Scenario::AuthVectors, args)),
            Commands::Discovery(args) => Some((Scenario::Discovery, args)),
            Commands::Register(args) => Some((Scenario::Registration, args)),
            Commands::SubscriberQuery(args) => Some((Scenario::SubscriberQuery, args)),
            Commands::Config { .. } => None,
        }
    }
}

/// Flags shared by every stress scenario
#[derive(Args, Debug, Clone, Default)]
pub struct ScenarioArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Sender containers to issue requests from (repeatable, comma separated)
    #[arg(long = "sender", value_name = "CONTAINER", value_delimiter = ',')]
    pub senders: Vec<String>,

    /// Target NF kinds (repeatable, comma separated)
    #[arg(long = "target", value_name = "KIND", value_delimiter = ',')]
    pub targets: Vec<NfKind>,

    /// Requester NF kinds for discovery (repeatable, comma separated)
    #[arg(long = "requester", value_name = "KIND", value_delimiter = ',')]
    pub requesters: Vec<NfKind>,

    #[command(flatten)]
    pub identity: IdentityArgs,
}

/// Scheduling and executor flags
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Number of requests to send
    #[arg(value_name = "NUM_REQUESTS")]
    pub num_requests: usize,

    /// Scheduling mode: seq or par
    #[arg(long, value_name = "MODE")]
    pub mode: Option<RunMode>,

    /// Maximum requests in flight in par mode
    #[arg(long, short = 'c', value_name = "N")]
    pub concurrency: Option<usize>,

    /// Delay between requests in seq mode, in milliseconds
    #[arg(long, value_name = "MS")]
    pub pace_ms: Option<u64>,

    /// Per-request timeout, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Seed for reproducible identifiers and targets
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Executor backend: docker or http
    #[arg(long, value_name = "BACKEND")]
    pub executor: Option<ExecutorBackend>,

    /// Install curl in sender containers that lack it
    #[arg(long)]
    pub auto_provision: bool,

    /// Use HTTP/2 without upgrade negotiation
    #[arg(long)]
    pub http2_prior_knowledge: bool,

    /// Output format: text or json
    #[arg(long, value_name = "FORMAT")]
    pub output: Option<ReportFormat>,
}

/// Identifier range flags
#[derive(Args, Debug, Clone, Default)]
pub struct IdentityArgs {
    /// First IMSI of the range
    #[arg(long, value_name = "IMSI")]
    pub imsi_start: Option<u64>,

    /// Last IMSI of the range (inclusive)
    #[arg(long, value_name = "IMSI")]
    pub imsi_end: Option<u64>,

    /// Digits per rendered IMSI
    #[arg(long, value_name = "DIGITS")]
    pub imsi_width: Option<usize>,

    /// Walk the range in order instead of sampling it
    #[arg(long)]
    pub sequential_ids: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(long, value_name = "PATH")]
        config_file: PathBuf,
    },

    /// Show the effective configuration
    Show {
        /// Output format: yaml, json
        #[arg(long, value_name = "FORMAT", default_value = "yaml")]
        format: String,
    },

    /// Print a sample configuration file
    Sample,
}
