use std::path::PathBuf;

use serde::Serialize;

/// Default minimum age, in days, for an environment to qualify.
pub const DEFAULT_AGE_THRESHOLD_DAYS: u32 = 60;
/// Default minimum size, in MiB, for an environment to qualify.
pub const DEFAULT_SIZE_THRESHOLD_MB: u32 = 200;

/// Age and size limits an environment must both exceed to qualify.
///
/// Comparisons are strict: an environment exactly at a threshold does not
/// qualify.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub age_days: f64,
    pub size_mb: f64,
}

impl Thresholds {
    pub fn new(age_days: f64, size_mb: f64) -> Self {
        Self { age_days, size_mb }
    }

    pub fn admits(&self, age_days: f64, size_mb: f64) -> bool {
        age_days > self.age_days && size_mb > self.size_mb
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::new(
            f64::from(DEFAULT_AGE_THRESHOLD_DAYS),
            f64::from(DEFAULT_SIZE_THRESHOLD_MB),
        )
    }
}

/// A discovered virtual environment and the measurements taken at scan time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// Absolute path of the `venv` directory
    pub environment_path: PathBuf,
    /// The directory containing the environment
    pub owner_path: PathBuf,
    /// Base name of `owner_path`
    pub owner_name: String,
    /// Days since `environment_path` was last modified
    pub age_days: f64,
    /// Recursive size of `environment_path` in MiB
    pub size_mb: f64,
    /// Whether the entry passed the thresholds the scan was run with.
    ///
    /// This is a snapshot. Re-filtering with other thresholds must go through
    /// [`filter`](crate::scan::filter) rather than read this field.
    pub meets_criteria: bool,
}

impl Entry {
    /// Evaluate this entry against `thresholds`, ignoring `meets_criteria`.
    pub fn qualifies(&self, thresholds: Thresholds) -> bool {
        thresholds.admits(self.age_days, self.size_mb)
    }
}
