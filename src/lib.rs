// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod store;
pub mod target;
pub mod task;

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{debug, info};

use crate::cli::{CliArgs, Command, LedgerCommand, parse_task_spec};
use crate::config::{ConfigFile, load_and_validate};
use crate::errors::{DagrunError, Result};
use crate::exec::run_tasks;
use crate::pipeline::{FileCohortSource, FixedCohorts, PipelineContext, TsvDirSink};
use crate::store::{CompletionStore, FileLedger};
use crate::task::{Task, TaskRegistry};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the task registry with the pipeline factories
/// - the completion ledger
/// - graph build + scheduler + worker pool
pub async fn run(args: CliArgs) -> Result<ExitCode> {
    let cfg = load_and_validate(&args.config)?;
    let registry = build_registry(&cfg);

    match args.command {
        Command::Tasks => {
            for name in registry.names() {
                println!("{name}");
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Ledger { command } => {
            let ledger = FileLedger::open(&cfg.core.ledger)?;
            run_ledger_command(&ledger, command)
        }

        Command::Run {
            tasks,
            concurrency,
            ledger,
            json,
        } => {
            let specs = if tasks.is_empty() {
                cfg.core.roots.clone()
            } else {
                tasks
            };
            if specs.is_empty() {
                return Err(DagrunError::Config(
                    "no root tasks given and [core].roots is empty".to_string(),
                ));
            }

            let mut roots: Vec<Arc<dyn Task>> = Vec::with_capacity(specs.len());
            for spec in &specs {
                let (name, params) = parse_task_spec(spec)?;
                roots.push(registry.instantiate(&name, params)?);
            }

            let ledger_dir = ledger.unwrap_or_else(|| cfg.core.ledger.clone());
            let store: Arc<dyn CompletionStore> = Arc::new(FileLedger::open(&ledger_dir)?);
            let concurrency = concurrency.unwrap_or(cfg.core.concurrency);

            info!(?specs, concurrency, ledger = %ledger_dir.display(), "starting run");

            let report = run_tasks(roots, store, concurrency).await?;

            if json {
                let rendered =
                    serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?;
                println!("{rendered}");
            } else {
                print!("{report}");
            }

            if report.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

/// Build the task registry with the pipeline collaborators from config.
fn build_registry(cfg: &ConfigFile) -> TaskRegistry {
    let cohorts: Arc<dyn pipeline::CohortSource> = if cfg.pipeline.cohorts.is_empty() {
        Arc::new(FileCohortSource::new(cfg.pipeline.reference.join("cohorts.txt")))
    } else {
        Arc::new(FixedCohorts(cfg.pipeline.cohorts.clone()))
    };

    let ctx = PipelineContext {
        reference: cfg.pipeline.reference.clone(),
        sink: Arc::new(TsvDirSink::new(&cfg.pipeline.out)),
        cohorts,
    };

    let mut registry = TaskRegistry::new();
    pipeline::register(&mut registry, ctx);
    debug!(?registry, "task registry built");
    registry
}

fn run_ledger_command(ledger: &FileLedger, command: LedgerCommand) -> Result<ExitCode> {
    match command {
        LedgerCommand::List => {
            for record in ledger.records()? {
                println!(
                    "{}\t{}\t{}",
                    record.completed_at.to_rfc3339(),
                    record.identity_key,
                    record.target_location
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        LedgerCommand::Forget { identity_key } => {
            if ledger.remove(&identity_key)? {
                println!("forgot '{identity_key}'");
                Ok(ExitCode::SUCCESS)
            } else {
                eprintln!("no record for '{identity_key}'");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
