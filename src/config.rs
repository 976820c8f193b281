use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::manifest::DEFAULT_FREEZE_TIMEOUT;
use crate::scan::{DEFAULT_AGE_THRESHOLD_DAYS, DEFAULT_SIZE_THRESHOLD_MB, Thresholds};

/// Settings for one scan-filter-act run.
///
/// Every entry point receives its settings through this value, so runs with
/// different settings never interfere.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Directory tree to scan
    root: PathBuf,
    /// Minimum age in days (exclusive)
    age_threshold_days: u32,
    /// Minimum size in MiB (exclusive)
    size_threshold_mb: u32,
    /// Report what would be deleted without deleting (default: true)
    dry_run: bool,
    /// Export a manifest before deleting (default: true)
    generate_manifest: bool,
    /// Replace an existing manifest (default: true)
    overwrite_manifest: bool,
    /// Limit for a single `pip freeze`
    manifest_timeout: Duration,
}

impl SweepConfig {
    /// Creates a new builder for [`SweepConfig`]
    pub fn builder() -> SweepConfigBuilder {
        SweepConfigBuilder::default()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn age_threshold_days(&self) -> u32 {
        self.age_threshold_days
    }

    pub fn size_threshold_mb(&self) -> u32 {
        self.size_threshold_mb
    }

    /// The thresholds as used by the scanner and the filter
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(
            f64::from(self.age_threshold_days),
            f64::from(self.size_threshold_mb),
        )
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn generate_manifest(&self) -> bool {
        self.generate_manifest
    }

    pub fn overwrite_manifest(&self) -> bool {
        self.overwrite_manifest
    }

    pub fn manifest_timeout(&self) -> Duration {
        self.manifest_timeout
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfigBuilder::default().build()
    }
}

/// Builder for [`SweepConfig`]
#[derive(Debug, Default)]
pub struct SweepConfigBuilder {
    root: Option<PathBuf>,
    age_threshold_days: Option<u32>,
    size_threshold_mb: Option<u32>,
    dry_run: Option<bool>,
    generate_manifest: Option<bool>,
    overwrite_manifest: Option<bool>,
    manifest_timeout: Option<Duration>,
}

impl SweepConfigBuilder {
    /// Set the directory to scan
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
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

    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = Some(enabled);
        self
    }

    pub fn generate_manifest(mut self, enabled: bool) -> Self {
        self.generate_manifest = Some(enabled);
        self
    }

    pub fn overwrite_manifest(mut self, enabled: bool) -> Self {
        self.overwrite_manifest = Some(enabled);
        self
    }

    pub fn manifest_timeout(mut self, timeout: Duration) -> Self {
        self.manifest_timeout = Some(timeout);
        self
    }

    /// Build the [`SweepConfig`]
    pub fn build(self) -> SweepConfig {
        SweepConfig {
            root: self.root.unwrap_or_else(|| PathBuf::from(".")),
            age_threshold_days: self.age_threshold_days.unwrap_or(DEFAULT_AGE_THRESHOLD_DAYS),
            size_threshold_mb: self.size_threshold_mb.unwrap_or(DEFAULT_SIZE_THRESHOLD_MB),
            dry_run: self.dry_run.unwrap_or(true),
            generate_manifest: self.generate_manifest.unwrap_or(true),
            overwrite_manifest: self.overwrite_manifest.unwrap_or(true),
            manifest_timeout: self.manifest_timeout.unwrap_or(DEFAULT_FREEZE_TIMEOUT),
        }
    }
}
