//! The `sweep` command: manifests first, then removal.

use serde::Serialize;

use crate::commands::{compile_patterns, run_scan, select_entries, wait_for};
use crate::config::SweepConfig;
use crate::error::{Result, SweepError};
use crate::logging::Logger;
use crate::manifest::{ManifestGenerator, ManifestTarget};
use crate::remove::{DRY_RUN_MARKER, environment_paths, total_space};
use crate::report::{BatchReport, format_mb};
use crate::scan::{Entry, filter};
use crate::worker;

/// What a sweep did.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    /// Environments the sweep acted on
    #[serde(skip)]
    pub selected: Vec<Entry>,
    /// Manifest export, absent when disabled
    pub manifests: Option<BatchReport>,
    pub removal: BatchReport,
}

pub struct Sweep<'a> {
    config: &'a SweepConfig,
    select: &'a [String],
    log: Logger,
}

#[derive(Default)]
pub struct SweepBuilder<'a> {
    config: Option<&'a SweepConfig>,
    select: &'a [String],
    log: Logger,
}

impl<'a> SweepBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: &'a SweepConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Owner path patterns narrowing the qualifying entries
    pub fn select(mut self, patterns: &'a [String]) -> Self {
        self.select = patterns;
        self
    }

    pub fn logger(mut self, log: Logger) -> Self {
        self.log = log;
        self
    }

    pub fn build(self) -> Result<Sweep<'a>> {
        let config = self.config.ok_or(SweepError::ConfigError {
            message: "Sweep requires a configuration".to_string(),
        })?;

        Ok(Sweep {
            config,
            select: self.select,
            log: self.log,
        })
    }
}

impl<'a> Sweep<'a> {
    pub fn builder() -> SweepBuilder<'a> {
        SweepBuilder::new()
    }

    /// Scan, filter, select, then export manifests and remove.
    ///
    /// Manifests are written before anything is deleted. A dry run writes
    /// no manifests and deletes nothing; both reports describe what would
    /// happen.
    pub fn run(self) -> Result<SweepReport> {
        let patterns = compile_patterns(self.select)?;
        let entries = run_scan(self.config, &self.log)?;
        let selected = select_entries(filter(&entries, self.config.thresholds()), &patterns);
        self.run_on(selected)
    }

    /// Export manifests for and remove exactly `selected`.
    pub fn run_on(self, selected: Vec<Entry>) -> Result<SweepReport> {
        let config = self.config;
        let log = self.log;

        if selected.is_empty() {
            log.info("No environments meet the criteria");
        } else {
            log.info(format!(
                "{}{} environment(s) selected, {} to reclaim",
                if config.dry_run() {
                    format!("{DRY_RUN_MARKER} ")
                } else {
                    String::new()
                },
                selected.len(),
                format_mb(total_space(&selected))
            ));
            for entry in &selected {
                log.verbose(
                    1,
                    format!(
                        "  {} ({:.1} days, {})",
                        entry.environment_path.display(),
                        entry.age_days,
                        format_mb(entry.size_mb)
                    ),
                );
            }
        }

        let manifests = if config.generate_manifest() {
            let generator = ManifestGenerator::new()
                .timeout(config.manifest_timeout())
                .dry_run(config.dry_run())
                .logger(log);
            let targets = selected.iter().map(ManifestTarget::from).collect();
            let task = worker::spawn_manifests(generator, targets, config.overwrite_manifest())?;
            let report = wait_for(task, &log)?;
            report.log(
                if config.dry_run() {
                    "Manifest generation (dry run)"
                } else {
                    "Manifest generation"
                },
                &log,
            );
            Some(report)
        } else {
            None
        };

        let task = worker::spawn_removal(environment_paths(&selected), config.dry_run(), log)?;
        let removal = wait_for(task, &log)?;
        removal.log(
            if config.dry_run() {
                "Removal (dry run)"
            } else {
                "Removal"
            },
            &log,
        );

        Ok(SweepReport {
            selected,
            manifests,
            removal,
        })
    }
}
