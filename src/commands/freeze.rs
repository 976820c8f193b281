//! The `freeze` command: manifests without removal.

use crate::commands::{compile_patterns, run_scan, select_entries, wait_for};
use crate::config::SweepConfig;
use crate::error::Result;
use crate::logging::Logger;
use crate::manifest::{ManifestGenerator, ManifestTarget};
use crate::report::BatchReport;
use crate::scan::filter;
use crate::worker;

/// Write `requirements.txt` for every qualifying, selected environment.
pub fn freeze(config: &SweepConfig, select: &[String], log: &Logger) -> Result<BatchReport> {
    let patterns = compile_patterns(select)?;
    let entries = run_scan(config, log)?;
    let selected = select_entries(filter(&entries, config.thresholds()), &patterns);

    if selected.is_empty() {
        log.info("No environments meet the criteria");
    }

    let generator = ManifestGenerator::new()
        .timeout(config.manifest_timeout())
        .logger(*log);
    let targets = selected.iter().map(ManifestTarget::from).collect();
    let task = worker::spawn_manifests(generator, targets, config.overwrite_manifest())?;
    let report = wait_for(task, log)?;
    report.log("Manifest generation", log);

    Ok(report)
}
