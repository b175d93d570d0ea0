//! Progress observation seam
//!
//! The orchestrator reports unit-level progress through [`JobObserver`]
//! instead of printing, so any rendering (plain log, progress bar, none)
//! can be substituted. [`LogObserver`] mirrors outcomes into tracing and
//! is the default.

use crate::address::WorkUnit;
use crate::downloader::job::JobOutcome;
use tracing::{debug, info, warn};

/// Result of one unit, as reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitResult {
    /// Fetched and written to disk.
    Downloaded,
    /// Output file already present; no network call was made.
    Skipped,
    /// Server answered 204: nothing to fetch for this unit.
    NoContent,
    /// Retries exhausted; the job continues with the next unit.
    Failed,
}

/// Callbacks the orchestrator invokes while running a job.
pub trait JobObserver: Send {
    /// A unit is about to be processed. `index` is zero-based, `total` the
    /// job's unit count.
    fn on_unit_start(&mut self, index: usize, total: usize, unit: &WorkUnit) {
        let _ = (index, total, unit);
    }

    /// A unit finished with `result`.
    fn on_unit_result(&mut self, unit: &WorkUnit, result: UnitResult) {
        let _ = (unit, result);
    }

    /// The job loop ended (normally or interrupted).
    fn on_job_complete(&mut self, outcome: &JobOutcome) {
        let _ = outcome;
    }
}

/// Default observer: tracing only.
#[derive(Debug, Default)]
pub struct LogObserver;

impl JobObserver for LogObserver {
    fn on_unit_start(&mut self, index: usize, total: usize, unit: &WorkUnit) {
        debug!(n = index + 1, total, %unit, "downloading");
    }

    fn on_unit_result(&mut self, unit: &WorkUnit, result: UnitResult) {
        match result {
            UnitResult::Downloaded => debug!(%unit, "downloaded"),
            UnitResult::Skipped => debug!(%unit, "already present, skipped"),
            UnitResult::NoContent => debug!(%unit, "no content, skipped"),
            UnitResult::Failed => warn!(%unit, "failed after retries"),
        }
    }

    fn on_job_complete(&mut self, outcome: &JobOutcome) {
        info!(
            downloaded = outcome.downloaded,
            skipped = outcome.skipped,
            failed = outcome.failed,
            interrupted = outcome.interrupted,
            "job complete"
        );
    }
}
