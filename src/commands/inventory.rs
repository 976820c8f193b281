//! The `scan` command: list environments without touching them.

use std::io::Write;

use crate::commands::{run_scan, stdout_error};
use crate::config::SweepConfig;
use crate::error::Result;
use crate::logging::Logger;
use crate::remove::total_space;
use crate::report::format_mb;
use crate::scan::{Entry, Thresholds, filter};

/// The entries a scan found, ready to print.
#[derive(Debug, Clone)]
pub struct Inventory {
    pub entries: Vec<Entry>,
    pub thresholds: Thresholds,
}

/// Scan `config.root()`, keeping only qualifying entries when `qualifying`.
pub fn inventory(config: &SweepConfig, qualifying: bool, log: &Logger) -> Result<Inventory> {
    let thresholds = config.thresholds();
    let mut entries = run_scan(config, log)?;
    if qualifying {
        entries = filter(&entries, thresholds);
    }

    Ok(Inventory {
        entries,
        thresholds,
    })
}

impl Inventory {
    /// Entries that pass the thresholds this inventory was built with
    pub fn qualifying(&self) -> Vec<Entry> {
        filter(&self.entries, self.thresholds)
    }

    /// Print one row per entry followed by the totals.
    pub fn write_table(&self, out: &mut dyn Write) -> Result<()> {
        if self.entries.is_empty() {
            writeln!(out, "No virtual environments found").map_err(stdout_error)?;
            return Ok(());
        }

        let name_width = self
            .entries
            .iter()
            .map(|entry| entry.owner_name.chars().count())
            .max()
            .unwrap_or(0)
            .max("PROJECT".len());

        writeln!(
            out,
            "{:<name_width$}  {:>8}  {:>10}  {:<9}  PATH",
            "PROJECT", "AGE", "SIZE", "QUALIFIES"
        )
        .map_err(stdout_error)?;
        for entry in &self.entries {
            writeln!(
                out,
                "{:<name_width$}  {:>7.1}d  {:>10}  {:<9}  {}",
                entry.owner_name,
                entry.age_days,
                format_mb(entry.size_mb),
                if entry.meets_criteria { "yes" } else { "no" },
                entry.environment_path.display()
            )
            .map_err(stdout_error)?;
        }

        let qualifying = self.qualifying();
        writeln!(
            out,
            "\n{} environment(s), {} total; {} qualifying, {} reclaimable",
            self.entries.len(),
            format_mb(total_space(&self.entries)),
            qualifying.len(),
            format_mb(total_space(&qualifying))
        )
        .map_err(stdout_error)?;

        Ok(())
    }
}
