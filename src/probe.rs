//! Size and age measurements for candidate environments.
//!
//! Both probes read only metadata. The size probe tolerates files that vanish
//! or cannot be stat'ed while it runs; the age probe does not, because a
//! missing directory means the caller's precondition no longer holds.

use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

use walkdir::WalkDir;

use crate::error::{Result, SweepError};

pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
pub const SECONDS_PER_DAY: f64 = 60.0 * 60.0 * 24.0;

/// Measurements the scanner takes for each candidate.
///
/// [`FsProbe`] is the real implementation; the seam exists so a scan can be
/// driven against a tree that changes underneath it.
pub trait Probe {
    /// Elapsed days since `path` was last modified.
    fn age_days(&self, path: &Path) -> Result<f64>;

    /// Recursive size of `path` in MiB.
    fn size_mb(&self, path: &Path) -> Result<f64>;
}

/// Probe backed by the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl Probe for FsProbe {
    fn age_days(&self, path: &Path) -> Result<f64> {
        age_days(path)
    }

    fn size_mb(&self, path: &Path) -> Result<f64> {
        size_mb(path)
    }
}

/// Total size of every regular file under `dir`, in MiB.
///
/// Symbolic links are neither followed nor counted. Entries that cannot be
/// read are skipped, so a partially unreadable tree still yields a total.
/// Fails only when `dir` itself is not a directory.
pub fn size_mb(dir: &Path) -> Result<f64> {
    Ok(size_bytes(dir)? as f64 / BYTES_PER_MB)
}

/// Same as [`size_mb`], in bytes.
pub fn size_bytes(dir: &Path) -> Result<u64> {
    let metadata = fs::symlink_metadata(dir).map_err(|source| SweepError::io(dir, source))?;
    if !metadata.is_dir() {
        return Err(SweepError::io(
            dir,
            io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
        ));
    }

    let total = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum();

    Ok(total)
}

/// Days elapsed since the last modification of `path`.
///
/// A modification time in the future counts as zero days.
pub fn age_days(path: &Path) -> Result<f64> {
    let modified = fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map_err(|source| SweepError::io(path, source))?;

    Ok(elapsed_days(modified, SystemTime::now()))
}

fn elapsed_days(modified: SystemTime, now: SystemTime) -> f64 {
    now.duration_since(modified)
        .unwrap_or(Duration::ZERO)
        .as_secs_f64()
        / SECONDS_PER_DAY
}
