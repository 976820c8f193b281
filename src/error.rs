//! Error types for venv-sweep.
//!
//! Errors are reserved for precondition violations and for failures that
//! stop a whole command (an invalid scan root, a broken worker thread, an
//! unwritable stdout). Failures that concern a single environment, such as a
//! missing directory or a `pip freeze` timeout, are never raised; they are
//! reported as an [`Outcome`](crate::report::Outcome) so that batch operations
//! keep going.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use venv_sweep::error::{Result, SweepError};
//!
//! fn check_root(path: &Path) -> Result<()> {
//!     if !path.is_dir() {
//!         return Err(SweepError::InvalidRoot {
//!             path: path.to_path_buf(),
//!             reason: "not a directory".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// Error types that can occur in venv-sweep operations
#[derive(Error, Debug, Diagnostic)]
pub enum SweepError {
    /// The scan root is missing or is not a directory.
    ///
    /// Checked before any traversal begins, so no partial inventory is ever
    /// produced for a bad root.
    #[error("Invalid scan root '{path}': {reason}")]
    #[diagnostic(
        code(venv_sweep::scan::invalid_root),
        help("Pass an existing directory with --root (or VENV_SWEEP_ROOT).")
    )]
    InvalidRoot {
        /// The root that was rejected
        path: PathBuf,
        /// Why the root was rejected
        reason: String,
    },

    /// A required path argument was empty or whitespace only.
    ///
    /// This is a caller error: the pipeline never builds blank paths itself.
    #[error("{argument} cannot be empty")]
    #[diagnostic(code(venv_sweep::path::empty))]
    EmptyPath {
        /// Name of the offending argument
        argument: &'static str,
    },

    /// File system I/O error outside the per-item outcome paths.
    #[error("I/O error accessing '{path}'")]
    #[diagnostic(code(venv_sweep::io_error))]
    IoError {
        /// The path that caused the I/O error
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to render an inventory or report as JSON.
    #[error("Failed to serialize output")]
    #[diagnostic(code(venv_sweep::output::serialization_error))]
    SerializationError(#[from] serde_json::Error),

    /// A `--select` pattern is not a valid regular expression.
    #[error("Invalid selection pattern '{pattern}'")]
    #[diagnostic(
        code(venv_sweep::select::invalid_pattern),
        help("Selection patterns use Rust regex syntax and match the project path.")
    )]
    InvalidPattern {
        /// The pattern as given on the command line
        pattern: String,
        /// The regex compilation error
        #[source]
        source: regex::Error,
    },

    /// The background worker panicked or hung up without a result.
    #[error("Background worker failed: {0}")]
    #[diagnostic(code(venv_sweep::worker::failed))]
    Worker(
        /// Description of the worker failure
        String,
    ),

    /// Invalid or incomplete configuration.
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(venv_sweep::config::error),
        help("Check the required configuration parameters.")
    )]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },
}

impl SweepError {
    /// Wrap an I/O error together with the path that produced it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }
}

/// Reject a path argument that is empty or only whitespace.
pub(crate) fn ensure_not_blank(path: &Path, argument: &'static str) -> Result<()> {
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(SweepError::EmptyPath { argument });
    }
    Ok(())
}

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, SweepError>;
