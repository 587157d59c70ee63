// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::errors::{DagrunError, Result};
use crate::task::Parameters;

/// Command-line arguments for `dagrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dagrun",
    version,
    about = "Dependency-ordered, idempotent task orchestrator for data-loading pipelines.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Dagrun.toml` in the current working directory; a missing
    /// file falls back to built-in defaults.
    #[arg(long, value_name = "PATH", default_value = "Dagrun.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DAGRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run a set of root tasks (and everything they require).
    Run {
        /// Root task specs, e.g. `load-all-cohorts` or
        /// `load-cohort-clinical:cohort=ACC`. Defaults to `[core].roots`
        /// from the config file.
        #[arg(value_name = "TASK")]
        tasks: Vec<String>,

        /// Worker pool size; overrides `[core].concurrency`.
        #[arg(long, value_name = "N")]
        concurrency: Option<usize>,

        /// Ledger directory; overrides `[core].ledger`.
        #[arg(long, value_name = "DIR")]
        ledger: Option<PathBuf>,

        /// Print the run report as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },

    /// List the registered task names.
    Tasks,

    /// Inspect or edit the completion ledger.
    Ledger {
        #[command(subcommand)]
        command: LedgerCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum LedgerCommand {
    /// List completion records.
    List,

    /// Remove the record for an identity key, forcing a re-run of the
    /// corresponding task.
    Forget {
        #[arg(value_name = "IDENTITY_KEY")]
        identity_key: String,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

/// Parse a task spec of the form `name` or `name:key=value,key2=value2`.
pub fn parse_task_spec(spec: &str) -> Result<(String, Parameters)> {
    let spec = spec.trim();
    let (name, rest) = match spec.split_once(':') {
        Some((name, rest)) => (name, Some(rest)),
        None => (spec, None),
    };

    if name.is_empty() {
        return Err(DagrunError::Config(format!("empty task name in spec '{spec}'")));
    }

    let mut params = Parameters::new();
    if let Some(rest) = rest {
        for pair in rest.split(',') {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                DagrunError::Config(format!(
                    "invalid parameter '{pair}' in task spec '{spec}' (expected key=value)"
                ))
            })?;
            if key.trim().is_empty() {
                return Err(DagrunError::Config(format!(
                    "empty parameter name in task spec '{spec}'"
                )));
            }
            params = params.with(key.trim(), value.trim());
        }
    }

    Ok((name.to_string(), params))
}
