//! Discovery of virtual environments under a root directory.
//!
//! A directory is a candidate environment when it is named exactly `venv`;
//! its parent is recorded as the owning project. The walk is pre-order and
//! never descends into a candidate, so environments nested inside another
//! environment are not reported.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use venv_sweep::scan::{self, Thresholds};
//!
//! let inventory = scan::scan(Path::new("projects"), Thresholds::default())?;
//! let stale = scan::filter(&inventory, Thresholds::new(30.0, 100.0));
//! println!("{} of {} environments are stale", stale.len(), inventory.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::{Result, SweepError};
use crate::logging::Logger;
use crate::probe::{FsProbe, Probe};

mod entry;
mod filter;

pub use entry::{DEFAULT_AGE_THRESHOLD_DAYS, DEFAULT_SIZE_THRESHOLD_MB, Entry, Thresholds};
pub use filter::filter;

/// Directory name that marks a virtual environment.
pub const CANDIDATE_DIR_NAME: &str = "venv";

/// Scan `root` with the file-system probe and no diagnostics output.
pub fn scan(root: &Path, thresholds: Thresholds) -> Result<Vec<Entry>> {
    Scanner::new().scan(root, thresholds)
}

/// Walks a directory tree and measures every candidate environment.
#[derive(Debug, Clone)]
pub struct Scanner<P = FsProbe> {
    probe: P,
    log: Logger,
}

impl Scanner<FsProbe> {
    pub fn new() -> Self {
        Self::with_probe(FsProbe)
    }
}

impl Default for Scanner<FsProbe> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Probe> Scanner<P> {
    pub fn with_probe(probe: P) -> Self {
        Self {
            probe,
            log: Logger::silent(),
        }
    }

    /// Route skip warnings and progress through `log`.
    pub fn logger(mut self, log: Logger) -> Self {
        self.log = log;
        self
    }

    /// Build the inventory of environments under `root`.
    ///
    /// Fails only when `root` is missing or not a directory. A candidate that
    /// cannot be measured (for example, deleted mid-scan) is skipped with a
    /// warning, as is any subdirectory that cannot be read.
    pub fn scan(&self, root: &Path, thresholds: Thresholds) -> Result<Vec<Entry>> {
        let root = validate_root(root)?;
        self.log.verbose(1, format!("Scanning {} for environments", root.display()));

        let mut entries = Vec::new();
        let walker = WalkDir::new(&root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_candidate(entry));

        for item in walker {
            let dir = match item {
                Ok(dir) => dir,
                Err(err) => {
                    self.log.warn(format!("skipping unreadable path: {err}"));
                    continue;
                }
            };
            if !dir.file_type().is_dir() {
                continue;
            }

            let environment_path = dir.path().join(CANDIDATE_DIR_NAME);
            if !is_real_dir(&environment_path) {
                continue;
            }

            match self.measure(dir.path(), environment_path, thresholds) {
                Ok(entry) => {
                    self.log.verbose(
                        2,
                        format!(
                            "  Found {} ({:.1} days, {:.1} MiB)",
                            entry.environment_path.display(),
                            entry.age_days,
                            entry.size_mb
                        ),
                    );
                    entries.push(entry);
                }
                Err(err) => self.log.warn(format!("skipping candidate: {err}")),
            }
        }

        self.log.verbose(1, format!("Found {} environments", entries.len()));
        Ok(entries)
    }

    fn measure(
        &self,
        owner_path: &Path,
        environment_path: PathBuf,
        thresholds: Thresholds,
    ) -> Result<Entry> {
        let age_days = self.probe.age_days(&environment_path)?;
        let size_mb = self.probe.size_mb(&environment_path)?;

        let owner_name = owner_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| owner_path.display().to_string());

        Ok(Entry {
            environment_path,
            owner_path: owner_path.to_path_buf(),
            owner_name,
            age_days,
            size_mb,
            meets_criteria: thresholds.admits(age_days, size_mb),
        })
    }
}

/// Reject missing or non-directory roots and make the root absolute.
fn validate_root(root: &Path) -> Result<PathBuf> {
    let invalid = |reason: &str| SweepError::InvalidRoot {
        path: root.to_path_buf(),
        reason: reason.to_string(),
    };

    if root.as_os_str().is_empty() {
        return Err(invalid("path is empty"));
    }
    if !root.exists() {
        return Err(invalid("directory does not exist"));
    }
    if !root.is_dir() {
        return Err(invalid("path is not a directory"));
    }

    std::path::absolute(root).map_err(|source| SweepError::io(root, source))
}

fn is_candidate(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name() == CANDIDATE_DIR_NAME
}

/// True for a directory that is not reached through a symlink.
fn is_real_dir(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false)
}
