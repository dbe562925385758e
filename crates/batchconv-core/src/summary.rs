//! Aggregate counts for a finished conversion run.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ConversionOutcome, OutcomeStatus};

/// Counts of each outcome status plus wall time of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Files imported and exported successfully.
    pub converted: usize,
    /// Files whose target already existed.
    pub skipped_existing: usize,
    /// Files with an extension no importer handles.
    pub skipped_unsupported: usize,
    /// Files that failed.
    pub failed: usize,
    /// All outcomes.
    pub total: usize,
    /// Wall time of the run in milliseconds.
    pub elapsed_ms: u64,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    /// Tally `outcomes`.
    pub fn from_outcomes(outcomes: &[ConversionOutcome], elapsed: Duration) -> Self {
        let count = |status: OutcomeStatus| outcomes.iter().filter(|o| o.status == status).count();

        Self {
            converted: count(OutcomeStatus::Converted),
            skipped_existing: count(OutcomeStatus::SkippedExisting),
            skipped_unsupported: count(OutcomeStatus::SkippedUnsupported),
            failed: count(OutcomeStatus::Failed),
            total: outcomes.len(),
            elapsed_ms: elapsed.as_millis() as u64,
            finished_at: Utc::now(),
        }
    }

    /// Returns `true` if any file failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Files that passed the extension filter.
    pub fn eligible(&self) -> usize {
        self.total - self.skipped_unsupported
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} converted, {} already existed, {} failed, {} unsupported ({} files in {} ms)",
            self.converted,
            self.skipped_existing,
            self.failed,
            self.skipped_unsupported,
            self.total,
            self.elapsed_ms
        )
    }
}
