//! # venv-sweep
//!
//! Finds Python virtual environments (directories named `venv`) under a
//! directory tree, reports their age and size, and reclaims disk space from
//! the stale ones, optionally exporting a `requirements.txt` for each before
//! it is deleted.
//!
//! ## Overview
//!
//! A run is a small pipeline:
//!
//! 1. [`scan`] walks the tree and measures every environment it finds,
//!    producing an ordered inventory of [`Entry`](scan::Entry) values.
//! 2. [`scan::filter`] keeps the entries that are both older and larger than
//!    the configured thresholds. It never touches disk, so it can be rerun
//!    with other thresholds at will.
//! 3. [`manifest`] captures `pip freeze` output into the owning project.
//! 4. [`remove`] deletes the environments, or only reports what it would
//!    delete in a dry run.
//!
//! Batch steps never stop at the first failure; each returns a
//! [`BatchReport`](report::BatchReport) with one row per input.
//!
//! ## Architecture
//!
//! - [`cli`]: Command-line interface definitions using clap
//! - [`commands`]: Implementation of the `scan`, `sweep` and `freeze`
//!   subcommands
//! - [`config`]: Per-run settings
//! - [`error`]: Error types and handling with thiserror + miette
//! - [`scan`], [`probe`]: Discovery and measurement
//! - [`manifest`], [`remove`], [`report`]: Actions and their reports
//! - [`worker`]: Runs long steps off the calling thread
//!
//! ## Library Usage
//!
//! ```no_run
//! use venv_sweep::config::SweepConfig;
//! use venv_sweep::remove::{environment_paths, remove_batch, total_space};
//! use venv_sweep::scan::{filter, scan};
//!
//! let config = SweepConfig::builder().root("/srv/projects").build();
//! let inventory = scan(config.root(), config.thresholds())?;
//! let stale = filter(&inventory, config.thresholds());
//! println!("{:.1} MiB reclaimable", total_space(&stale));
//!
//! let report = remove_batch(&environment_paths(&stale), true)?;
//! println!("{}", report.summary("Dry run"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! The crate uses a combination of:
//! - `thiserror` for strongly-typed errors
//! - `miette` for rich diagnostic output in CLI
//!
//! Problems with a single environment are reported as outcomes inside a
//! batch report rather than as errors.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod probe;
pub mod remove;
pub mod report;
pub mod scan;
pub mod worker;
