//! Progress accounting for a single batch run.
//!
//! Progress is reported against the actionable file count: the total number
//! of files minus those excluded so far. Both the numerator and denominator
//! shrink as exclusions are recorded.

use serde::Serialize;

use crate::core::manifest::Manifest;

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    pub total_files: usize,
    /// Files that went through command execution (excluded files not counted).
    pub processed_files: usize,
    pub excluded_files: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RunAccountant {
    total: usize,
    visited: usize,
    excluded: usize,
}

impl RunAccountant {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            visited: 0,
            excluded: 0,
        }
    }

    pub fn for_manifest(manifest: &Manifest) -> Self {
        Self::new(Self::total(manifest))
    }

    /// Count of non-directory entries.
    pub fn total(manifest: &Manifest) -> usize {
        manifest.file_count()
    }

    /// One-based position of the file about to be handled.
    pub fn next_ordinal(&self) -> usize {
        self.visited + 1
    }

    pub fn record_excluded(&mut self) {
        self.visited += 1;
        self.excluded += 1;
    }

    pub fn record_processed(&mut self) {
        self.visited += 1;
    }

    pub fn processed(&self) -> usize {
        self.visited - self.excluded
    }

    pub fn excluded(&self) -> usize {
        self.excluded
    }

    pub fn actionable_total(&self) -> usize {
        self.total.saturating_sub(self.excluded)
    }

    /// Line announcing the file about to be excluded.
    pub fn excluding_line(&self, path: &str) -> String {
        format!("Excluding file {}/{}: {path}", self.next_ordinal(), self.total)
    }

    /// Line announcing the file about to be processed.
    pub fn processing_line(&self, path: &str) -> String {
        format!("Processing file {}/{}: {path}", self.next_ordinal(), self.total)
    }

    pub fn progress_line(&self) -> String {
        format!(
            "Progress: {}/{} processed ({} excluded)",
            self.processed(),
            self.actionable_total(),
            self.excluded
        )
    }

    pub fn counters(&self) -> RunCounters {
        RunCounters {
            total_files: self.total,
            processed_files: self.processed(),
            excluded_files: self.excluded,
        }
    }
}
