//! Per-item outcome collection for batch runs
//!
//! Batch loops keep going past per-item failures and stop only on fatal
//! ones; the report records both so callers see every failure instead of
//! only log lines.

use std::path::{Path, PathBuf};

use log::error;
use serde::Serialize;

use crate::error::MorphError;

/// Outcome of a batch run over a directory
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    /// Output files written
    pub processed: Vec<PathBuf>,
    /// Inputs that failed, with the reason
    pub failed: Vec<(PathBuf, String)>,
    /// Set when a fatal error stopped the batch early
    pub aborted: Option<String>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.aborted.is_none()
    }

    /// Record a per-item failure, returning true if the batch must stop
    pub fn record_failure(&mut self, input: &Path, err: &MorphError) -> bool {
        error!("Error processing {}: {}", input.display(), err);
        self.failed.push((input.to_path_buf(), err.to_string()));
        if err.is_fatal() {
            self.aborted = Some(err.to_string());
            return true;
        }
        false
    }

    /// One-line summary for the CLI
    pub fn summary(&self, verb: &str) -> String {
        let mut line = format!("{} {}, {} failed", self.processed.len(), verb, self.failed.len());
        if let Some(reason) = &self.aborted {
            line.push_str(&format!(" (aborted: {reason})"));
        }
        line
    }
}
