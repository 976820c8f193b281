//! Per-item outcomes and the aggregate report shared by every batch action.

use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;

use crate::logging::Logger;

/// Number of characters of failure detail shown to the operator.
pub const FAILURE_EXCERPT_CHARS: usize = 500;

/// Result of acting on a single environment.
///
/// Environmental failures (missing directories, permission errors, timeouts)
/// are outcomes, not errors, so a batch can continue past them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
}

impl Outcome {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// One row of a [`BatchReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResult {
    /// The environment the action was applied to
    pub subject_path: PathBuf,
    pub success: bool,
    pub message: String,
}

/// Aggregate result of a batch action, one row per input item in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<ItemResult>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item outcome, keeping the counters in step with `results`.
    pub fn record(&mut self, subject_path: impl Into<PathBuf>, outcome: Outcome) {
        self.total += 1;
        if outcome.success {
            self.successful += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(ItemResult {
            subject_path: subject_path.into(),
            success: outcome.success,
            message: outcome.message,
        });
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemResult> {
        self.results.iter().filter(|r| !r.success)
    }

    /// Newline-joined failure messages, cut to `max_chars` characters.
    pub fn failure_excerpt(&self, max_chars: usize) -> String {
        let joined = self
            .failures()
            .map(|r| r.message.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        match joined.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}...", &joined[..cut]),
            None => joined,
        }
    }

    /// Render the counts and a bounded failure excerpt under `title`.
    pub fn summary(&self, title: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== {title} ===");
        let _ = writeln!(out, "Total: {}", self.total);
        let _ = writeln!(out, "Successful: {}", self.successful);
        let _ = writeln!(out, "Failed: {}", self.failed);
        if self.failed > 0 {
            let _ = writeln!(out, "Failures:");
            let _ = writeln!(out, "{}", self.failure_excerpt(FAILURE_EXCERPT_CHARS));
        }
        out
    }

    /// Print the summary, with every row at verbosity 1.
    pub fn log(&self, title: &str, log: &Logger) {
        log.info(self.summary(title).trim_end());
        for row in &self.results {
            let mark = if row.success { "ok" } else { "FAILED" };
            log.verbose(
                1,
                format!("  [{mark}] {}: {}", row.subject_path.display(), row.message),
            );
        }
    }
}

/// Format a MiB quantity for people.
pub fn format_mb(mb: f64) -> String {
    if mb >= 1024.0 {
        format!("{:.1} GiB", mb / 1024.0)
    } else {
        format!("{mb:.1} MiB")
    }
}
