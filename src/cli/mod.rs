//! CLI module for the fleet guardian
//!
//! # Commands
//!
//! - `run` - Start the guardian daemon (control loop + status API)
//! - `check` - Probe every node once and print the result, taking no action
//! - `status` - Show a running daemon's fleet snapshot
//! - `pause` / `resume` - Toggle a running daemon's automated actions
//! - `reset` - Reset one node's restart budget on a running daemon
//! - `config` - Configuration utilities (init, validate)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start the guardian with the default config file
//! guardian run
//!
//! # One-off probe round as JSON
//! guardian check --json
//!
//! # Take the guardian's hands off the fleet during maintenance
//! guardian pause
//! ```

pub mod check;
pub mod completions;
pub mod config;
pub mod output;
pub mod remote;
pub mod run;

pub use completions::handle_completions;
pub use config::{handle_config_init, handle_config_validate};

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Fleet guardian - health monitoring and auto-recovery for a small node set
#[derive(Parser, Debug)]
#[command(
    name = "guardian",
    version,
    about = "Fleet health monitor with guarded auto-restart"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the guardian daemon
    Run(RunArgs),
    /// Probe every node once without acting
    Check(CheckArgs),
    /// Show the running guardian's fleet status
    Status(RemoteArgs),
    /// Suspend crash marking and restarts
    Pause(RemoteArgs),
    /// Resume crash marking and restarts
    Resume(RemoteArgs),
    /// Reset a node's restart budget
    Reset(ResetArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "guardian.toml")]
    pub config: PathBuf,

    /// Override API port
    #[arg(short, long, env = "GUARDIAN_PORT")]
    pub port: Option<u16>,

    /// Override API host
    #[arg(short = 'H', long, env = "GUARDIAN_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "GUARDIAN_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Start with automated actions paused
    #[arg(long)]
    pub paused: bool,

    /// Do not start the status/control API
    #[arg(long)]
    pub no_api: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "guardian.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct RemoteArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Guardian API base URL (defaults to the configured server address)
    #[arg(long, env = "GUARDIAN_URL")]
    pub url: Option<String>,

    /// Path to configuration file
    #[arg(short, long, default_value = "guardian.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Node name
    pub node: String,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
    /// Load and validate a configuration file
    Validate(ConfigValidateArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "guardian.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ConfigValidateArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "guardian.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
