use super::entry::{Entry, Thresholds};

/// Entries whose age and size both strictly exceed `thresholds`.
///
/// The stored `meets_criteria` flag is ignored, so an inventory scanned with
/// one set of thresholds can be re-filtered with another without touching
/// disk. Input order is preserved.
pub fn filter(entries: &[Entry], thresholds: Thresholds) -> Vec<Entry> {
    entries
        .iter()
        .filter(|entry| entry.qualifies(thresholds))
        .cloned()
        .collect()
}
