//! Implementation of venv-sweep subcommands.
//!
//! `mod.rs` is a thin dispatcher plus the pieces every command shares:
//! turning parsed arguments into a [`SweepConfig`], running the pipeline
//! steps on worker threads, and narrowing the inventory with `--select`
//! patterns. Command logic lives in `inventory`, `sweep` and `freeze`.

use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use regex::Regex;
use serde::Serialize;

use crate::cli::{ActionOpts, Cli, Commands};
use crate::config::{SweepConfig, SweepConfigBuilder};
use crate::error::{Result, SweepError};
use crate::logging::Logger;
use crate::scan::Entry;
use crate::worker::{self, Task};

pub(crate) mod freeze;
pub(crate) mod inventory;
pub(crate) mod sweep;

pub use freeze::freeze;
pub use inventory::{Inventory, inventory};
pub use sweep::{Sweep, SweepBuilder, SweepReport};


/// How often a running scan reports that it is still busy.
pub(crate) const PROGRESS_INTERVAL: Duration = Duration::from_secs(2);

/// Execute commands based on the parsed CLI arguments.
pub fn execute(cli: &Cli) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute_with_output(cli, &mut out)
}

/// Execute commands, writing command output to `out` instead of stdout.
pub fn execute_with_output(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    let opts = cli.global_opts();
    let log = Logger::new(opts.verbose(), opts.quiet());

    match cli.command() {
        Commands::Scan { qualifying, json } => {
            let config = config_builder(cli).build();
            let inventory = inventory(&config, *qualifying, &log)?;
            if *json {
                write_json(out, &inventory.entries)
            } else {
                inventory.write_table(out)
            }
        }
        Commands::Sweep {
            no_dry_run,
            no_manifest,
            action,
        } => {
            let config = action_config(cli, action)
                .dry_run(!no_dry_run)
                .generate_manifest(!no_manifest)
                .build();
            let report = Sweep::builder()
                .config(&config)
                .select(&action.select)
                .logger(log)
                .build()?
                .run()?;
            if action.json {
                write_json(out, &report)
            } else {
                Ok(())
            }
        }
        Commands::Freeze { action } => {
            let config = action_config(cli, action).build();
            let report = freeze(&config, &action.select, &log)?;
            if action.json {
                write_json(out, &report)
            } else {
                Ok(())
            }
        }
    }
}

fn config_builder(cli: &Cli) -> SweepConfigBuilder {
    let opts = cli.global_opts();
    SweepConfig::builder()
        .root(opts.get_root())
        .age_threshold_days(opts.age_threshold_days())
        .size_threshold_mb(opts.size_threshold_mb())
}

fn action_config(cli: &Cli, action: &ActionOpts) -> SweepConfigBuilder {
    config_builder(cli)
        .overwrite_manifest(!action.keep_existing_manifest)
        .manifest_timeout(Duration::from_secs(action.manifest_timeout_secs))
}

/// Scan `config.root()` on a worker thread, reporting progress while waiting.
pub(crate) fn run_scan(config: &SweepConfig, log: &Logger) -> Result<Vec<Entry>> {
    wait_for(worker::spawn_scan(config, *log)?, log)
}

/// Block on `task`, reporting at verbosity 1 while it is still running.
pub(crate) fn wait_for<T: Send + 'static>(task: Task<T>, log: &Logger) -> Result<T> {
    let started = Instant::now();
    loop {
        if let Some(result) = task.wait_timeout(PROGRESS_INTERVAL) {
            log.verbose(
                1,
                format!(
                    "{} finished in {:.1}s",
                    task.name(),
                    started.elapsed().as_secs_f64()
                ),
            );
            return result;
        }
        log.verbose(
            1,
            format!(
                "Still running {} ({}s elapsed)",
                task.name(),
                started.elapsed().as_secs()
            ),
        );
    }
}

/// Compile `--select` patterns, naming the first one that is invalid.
pub(crate) fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| SweepError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

/// Keep the entries whose owner path matches any of `patterns`.
///
/// No patterns selects everything.
pub fn select_entries(entries: Vec<Entry>, patterns: &[Regex]) -> Vec<Entry> {
    if patterns.is_empty() {
        return entries;
    }

    entries
        .into_iter()
        .filter(|entry| {
            let owner = entry.owner_path.to_string_lossy();
            patterns.iter().any(|re| re.is_match(&owner))
        })
        .collect()
}

pub(crate) fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out).map_err(stdout_error)
}

pub(crate) fn stdout_error(source: io::Error) -> SweepError {
    SweepError::io(Path::new("<stdout>"), source)
}
