//! CLI for pdfsweep.

mod commands;
mod narrate;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use pdfsweep_core::config::{self, ConfigOverrides, SweepConfig};
use pdfsweep_core::NodeId;
use std::path::PathBuf;

use commands::{run_completions, run_config, run_man, run_status, run_sweep};

/// Top-level CLI for pdfsweep.
#[derive(Debug, Parser)]
#[command(name = "pdfsweep", version)]
#[command(
    about = "pdfsweep: download every PDF served in a numeric node range, resuming where the last run stopped",
    long_about = None
)]
pub struct Cli {
    /// Defaults to `run` with the configured settings.
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

/// Settings shared by commands that read the sweep configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct SweepArgs {
    /// Config file to use instead of ~/.config/pdfsweep/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// First node ID of the range.
    #[arg(long, value_name = "ID")]
    pub start: Option<NodeId>,
    /// Last node ID of the range (inclusive).
    #[arg(long, value_name = "ID")]
    pub end: Option<NodeId>,
    /// Directory for downloaded PDFs and the manifest.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
    /// URL template; `{id}` is replaced by the node ID.
    #[arg(long, value_name = "TEMPLATE")]
    pub base_url: Option<String>,
    /// Connect and stall timeout per request, in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
    /// Pause after every node, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,
}

impl SweepArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            start_node: self.start,
            end_node: self.end,
            output_dir: self.output_dir.clone(),
            base_url_template: self.base_url.clone(),
            request_timeout_secs: self.timeout,
            retry_delay_ms: self.delay_ms,
        }
    }

    /// Load the config file (explicit path, or the XDG default created on first use)
    /// and apply command-line overrides.
    pub fn load_config(&self) -> Result<SweepConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_from_path(path)?,
            None => config::load_or_init()?,
        };
        self.overrides().apply(&mut cfg);
        tracing::debug!("loaded config: {:?}", cfg);
        Ok(cfg)
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Sweep the node range and save every PDF found.
    Run {
        #[command(flatten)]
        args: SweepArgs,
    },

    /// Show artifacts on disk and where the next run would resume. No network access.
    Status {
        #[command(flatten)]
        args: SweepArgs,
    },

    /// Print the config file location and the effective configuration.
    Config {
        #[command(flatten)]
        args: SweepArgs,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Render the man page (roff) to stdout.
    Man,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let command = cli.command.unwrap_or(CliCommand::Run {
            args: SweepArgs::default(),
        });

        match command {
            CliCommand::Run { args } => run_sweep(&args.load_config()?)?,
            CliCommand::Status { args } => run_status(&args.load_config()?)?,
            CliCommand::Config { args } => {
                let path = match &args.config {
                    Some(p) => p.clone(),
                    None => config::config_path()?,
                };
                run_config(&args.load_config()?, &path)?;
            }
            CliCommand::Completions { shell } => run_completions(shell)?,
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
