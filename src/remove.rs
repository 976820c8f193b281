//! Deletion of environment directories.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Result, ensure_not_blank};
use crate::logging::Logger;
use crate::report::{BatchReport, Outcome};
use crate::scan::Entry;

/// Marker that prefixes every simulated-deletion message.
pub const DRY_RUN_MARKER: &str = "[DRY RUN]";

/// Delete `environment_path` and everything below it.
///
/// With `dry_run` nothing is touched and the message starts with
/// [`DRY_RUN_MARKER`]. A blank path is the only `Err`; a missing path, a
/// non-directory, or a failed delete comes back as a failed [`Outcome`].
pub fn remove(environment_path: &Path, dry_run: bool) -> Result<Outcome> {
    ensure_not_blank(environment_path, "environment_path")?;

    if !environment_path.exists() {
        return Ok(Outcome::failed(format!(
            "Path does not exist: {}",
            environment_path.display()
        )));
    }
    if !environment_path.is_dir() {
        return Ok(Outcome::failed(format!(
            "Path is not a directory: {}",
            environment_path.display()
        )));
    }

    if dry_run {
        return Ok(Outcome::succeeded(format!(
            "{DRY_RUN_MARKER} Would delete: {}",
            environment_path.display()
        )));
    }

    Ok(match fs::remove_dir_all(environment_path) {
        Ok(()) => Outcome::succeeded(format!(
            "Successfully deleted: {}",
            environment_path.display()
        )),
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => Outcome::failed(format!(
            "Permission denied: {} - {err}",
            environment_path.display()
        )),
        Err(err) => Outcome::failed(format!(
            "Error deleting {}: {err}",
            environment_path.display()
        )),
    })
}

/// Remove every path in order and report on each.
///
/// All paths are checked for blankness before anything is deleted, so a
/// malformed batch fails as a whole without side effects. After that, an
/// item's failure never stops the rest.
pub fn remove_batch<P: AsRef<Path>>(environment_paths: &[P], dry_run: bool) -> Result<BatchReport> {
    remove_batch_logged(environment_paths, dry_run, &Logger::silent())
}

/// [`remove_batch`] with per-item progress on `log` at verbosity 1.
pub fn remove_batch_logged<P: AsRef<Path>>(
    environment_paths: &[P],
    dry_run: bool,
    log: &Logger,
) -> Result<BatchReport> {
    for path in environment_paths {
        ensure_not_blank(path.as_ref(), "environment_path")?;
    }

    let mut report = BatchReport::new();
    for path in environment_paths {
        let path = path.as_ref();
        let outcome = remove(path, dry_run)?;
        log.verbose(1, format!("  {}", outcome.message));
        report.record(path, outcome);
    }

    Ok(report)
}

/// Environment paths of `entries`, ready for [`remove_batch`].
pub fn environment_paths(entries: &[Entry]) -> Vec<PathBuf> {
    entries
        .iter()
        .map(|entry| entry.environment_path.clone())
        .collect()
}

/// MiB that deleting `entries` would free, from the sizes measured at scan
/// time. Never touches disk.
pub fn total_space(entries: &[Entry]) -> f64 {
    entries.iter().map(|entry| entry.size_mb).sum()
}
