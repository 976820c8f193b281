//! Command-line interface definitions for venv-sweep.
//!
//! This module defines the CLI structure using clap, including all subcommands
//! and their arguments. The main entry point is the [`Cli`] struct.
//!
//! # Example
//!
//! ```no_run
//! use venv_sweep::cli::{Cli, Commands};
//!
//! let cli = Cli::parse_args();
//!
//! match cli.command() {
//!     Commands::Scan { json, .. } => println!("Scanning (json: {json})"),
//!     Commands::Sweep { no_dry_run, .. } => {
//!         println!("Sweeping, deleting for real: {no_dry_run}");
//!     }
//!     _ => {}
//! }
//! ```

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::error::{Result, SweepError};
use crate::manifest::DEFAULT_FREEZE_TIMEOUT;
use crate::scan::{DEFAULT_AGE_THRESHOLD_DAYS, DEFAULT_SIZE_THRESHOLD_MB};


/// Main command-line interface for venv-sweep.
///
/// Global options describe what to scan and which environments qualify; the
/// subcommand decides what happens to them.
#[derive(Parser)]
#[command(
    name = "venv-sweep",
    bin_name = "venv-sweep",
    author,
    version,
    about = "Find stale Python virtual environments and reclaim their disk space",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    global_opts: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

/// Global options that apply to all venv-sweep commands.
#[derive(Parser)]
pub struct GlobalOpts {
    /// Directory tree to scan for `venv` folders (`~` is expanded)
    #[arg(long, global = true, default_value = ".", env = "VENV_SWEEP_ROOT")]
    root: PathBuf,

    /// Only environments untouched for more than this many days qualify
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_AGE_THRESHOLD_DAYS,
        env = "VENV_SWEEP_AGE_THRESHOLD_DAYS"
    )]
    age_threshold_days: u32,

    /// Only environments larger than this many MiB qualify
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_SIZE_THRESHOLD_MB,
        env = "VENV_SWEEP_SIZE_THRESHOLD_MB"
    )]
    size_threshold_mb: u32,

    /// Enable verbose output (use multiple times for more verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count, env = "VENV_SWEEP_VERBOSE")]
    verbose: u8,

    /// Silence all output except for errors
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        env = "VENV_SWEEP_QUIET"
    )]
    quiet: bool,
}

impl GlobalOpts {
    /// Create a new builder for constructing `GlobalOpts` programmatically.
    pub fn builder() -> GlobalOptsBuilder {
        GlobalOptsBuilder::default()
    }

    /// The scan root with `~` expanded, made absolute and cleaned up
    pub fn get_root(&self) -> PathBuf {
        normalize_path(expand_home(self.root()))
    }

    /// The scan root as given
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn age_threshold_days(&self) -> u32 {
        self.age_threshold_days
    }

    pub fn size_threshold_mb(&self) -> u32 {
        self.size_threshold_mb
    }

    /// Get the verbose level
    pub fn verbose(&self) -> u8 {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn quiet(&self) -> bool {
        self.quiet
    }
}

/// Builder for constructing `GlobalOpts` without going through argument
/// parsing.
#[derive(Default)]
pub struct GlobalOptsBuilder {
    root: Option<PathBuf>,
    age_threshold_days: Option<u32>,
    size_threshold_mb: Option<u32>,
    verbose: u8,
    quiet: bool,
}

impl GlobalOptsBuilder {
    /// Set the scan root.
    pub fn root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.root = Some(dir.into());
        self
    }

    pub fn age_threshold_days(mut self, days: u32) -> Self {
        self.age_threshold_days = Some(days);
        self
    }

    pub fn size_threshold_mb(mut self, mb: u32) -> Self {
        self.size_threshold_mb = Some(mb);
        self
    }

    /// Set the verbosity level (0 = normal, 1+ = verbose).
    pub fn verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    /// Enable or disable quiet mode.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Build the `GlobalOpts` instance with the configured values.
    pub fn build(self) -> GlobalOpts {
        GlobalOpts {
            root: self.root.unwrap_or_else(|| PathBuf::from(".")),
            age_threshold_days: self.age_threshold_days.unwrap_or(DEFAULT_AGE_THRESHOLD_DAYS),
            size_threshold_mb: self.size_threshold_mb.unwrap_or(DEFAULT_SIZE_THRESHOLD_MB),
            verbose: self.verbose,
            quiet: self.quiet,
        }
    }
}

impl Cli {
    /// Get the global options
    pub fn global_opts(&self) -> &GlobalOpts {
        &self.global_opts
    }

    /// Get the command
    pub fn command(&self) -> &Commands {
        &self.command
    }

    /// Create a builder for programmatic construction
    pub fn builder() -> CliBuilder {
        CliBuilder::default()
    }

    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Builder for [`Cli`]
#[derive(Debug, Default)]
pub struct CliBuilder {
    root: Option<PathBuf>,
    age_threshold_days: Option<u32>,
    size_threshold_mb: Option<u32>,
    verbose: u8,
    quiet: bool,
    command: Option<Commands>,
}

impl CliBuilder {
    pub fn root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.root = Some(dir.into());
        self
    }

    pub fn age_threshold_days(mut self, days: u32) -> Self {
        self.age_threshold_days = Some(days);
        self
    }

    pub fn size_threshold_mb(mut self, mb: u32) -> Self {
        self.size_threshold_mb = Some(mb);
        self
    }

    pub fn verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    pub fn quiet(mut self, enabled: bool) -> Self {
        self.quiet = enabled;
        self
    }

    pub fn command(mut self, command: Commands) -> Self {
        self.command = Some(command);
        self
    }

    /// Build the Cli instance
    pub fn build(self) -> Result<Cli> {
        let command = self.command.ok_or(SweepError::ConfigError {
            message: "Command is required".to_string(),
        })?;

        let mut global_opts = GlobalOpts::builder()
            .root(self.root.unwrap_or_else(|| PathBuf::from(".")))
            .verbose(self.verbose)
            .quiet(self.quiet);
        if let Some(days) = self.age_threshold_days {
            global_opts = global_opts.age_threshold_days(days);
        }
        if let Some(mb) = self.size_threshold_mb {
            global_opts = global_opts.size_threshold_mb(mb);
        }

        Ok(Cli {
            global_opts: global_opts.build(),
            command,
        })
    }
}

/// Replace a leading `~` with the user's home directory.
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match home::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

/// Normalize a path to be absolute and clean, without requiring it to exist.
///
/// This function:
/// - Converts relative paths to absolute using the current directory
/// - Removes `.` and `..` components where possible
/// - Does NOT resolve symlinks
fn normalize_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    let absolute = if path.is_relative() {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    } else {
        path.to_path_buf()
    };

    let mut components = Vec::new();
    for component in absolute.components() {
        use std::path::Component;
        match component {
            Component::ParentDir => {
                if let Some(last) = components.last()
                    && !matches!(last, Component::ParentDir | Component::RootDir)
                {
                    components.pop();
                    continue;
                }
                if matches!(components.last(), Some(Component::RootDir)) {
                    continue;
                }
                components.push(component);
            }
            Component::CurDir => continue,
            _ => components.push(component),
        }
    }

    components.into_iter().collect()
}

/// Options shared by the commands that act on the selected environments.
#[derive(Debug, Clone, Args)]
pub struct ActionOpts {
    /// Only act on environments whose project path matches this regex
    /// (repeatable; any match selects)
    #[arg(long = "select", value_name = "REGEX")]
    pub select: Vec<String>,

    /// Leave an existing requirements.txt untouched instead of replacing it
    #[arg(long, env = "VENV_SWEEP_KEEP_EXISTING_MANIFEST")]
    pub keep_existing_manifest: bool,

    /// Seconds a single `pip freeze` may run before it is killed
    #[arg(
        long,
        default_value_t = DEFAULT_FREEZE_TIMEOUT.as_secs(),
        env = "VENV_SWEEP_MANIFEST_TIMEOUT_SECS"
    )]
    pub manifest_timeout_secs: u64,

    /// Print the reports as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl Default for ActionOpts {
    fn default() -> Self {
        Self {
            select: Vec::new(),
            keep_existing_manifest: false,
            manifest_timeout_secs: DEFAULT_FREEZE_TIMEOUT.as_secs(),
            json: false,
        }
    }
}

/// Available venv-sweep subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List every `venv` folder under the root with its age and size
    ///
    /// Nothing is modified. Entries that pass both thresholds are flagged.
    Scan {
        /// Only list environments that pass both thresholds
        #[arg(long)]
        qualifying: bool,

        /// Print the inventory as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Export manifests for, then delete, the qualifying environments
    ///
    /// Runs as a dry run unless --no-dry-run is given: the report lists what
    /// would be deleted and nothing is removed. Manifests
    /// (requirements.txt in each project directory) are written before any
    /// deletion unless --no-manifest is given.
    Sweep {
        /// Actually delete the environments
        #[arg(long, env = "VENV_SWEEP_NO_DRY_RUN")]
        no_dry_run: bool,

        /// Skip writing requirements.txt before deleting
        #[arg(long, env = "VENV_SWEEP_NO_MANIFEST")]
        no_manifest: bool,

        #[command(flatten)]
        action: ActionOpts,
    },

    /// Export requirements.txt for the qualifying environments only
    Freeze {
        #[command(flatten)]
        action: ActionOpts,
    },
}
