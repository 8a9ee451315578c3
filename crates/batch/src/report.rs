//! Batch run reporting.

use chrono::{DateTime, Utc};
use rounds_core::{FailureKind, MatchResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A match file that contributed no rows, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

/// Summary statistics for one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the last match finished.
    pub finished_at: DateTime<Utc>,
    /// Number of match files submitted.
    pub files: usize,
    /// Number of accepted matches.
    pub accepted_files: usize,
    /// Number of rejected matches.
    pub failed_files: usize,
    /// Round summaries emitted across all accepted matches.
    pub rounds_emitted: usize,
    /// Rejections per failure kind.
    pub failures_by_kind: BTreeMap<FailureKind, usize>,
}

impl BatchReport {
    /// Tally a finished run.
    pub fn from_results(
        results: &[MatchResult],
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let mut report = Self {
            started_at,
            finished_at,
            files: results.len(),
            accepted_files: 0,
            failed_files: 0,
            rounds_emitted: 0,
            failures_by_kind: BTreeMap::new(),
        };

        for result in results {
            match result {
                MatchResult::Accepted { rounds, .. } => {
                    report.accepted_files += 1;
                    report.rounds_emitted += rounds.len();
                }
                MatchResult::Rejected { kind, .. } => {
                    report.failed_files += 1;
                    *report.failures_by_kind.entry(*kind).or_insert(0) += 1;
                }
            }
        }

        report
    }

    /// Wall-clock duration of the run in seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}
