//! indicatif-backed progress rendering
//!
//! Implements the orchestrator's observer seam with a terminal progress
//! bar. One bar per job, created lazily when the first unit starts.

use crate::address::WorkUnit;
use crate::downloader::{JobObserver, JobOutcome, UnitResult};
use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar renderer for interactive runs.
#[derive(Debug, Default)]
pub struct ProgressRender {
    bar: Option<ProgressBar>,
}

impl ProgressRender {
    pub fn new() -> Self {
        Self::default()
    }

    fn bar_for(&mut self, total: usize) -> &ProgressBar {
        self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(
                ProgressStyle::with_template(
                    "{pos:>6}/{len:6} [{bar:30}] {msg} ({elapsed} elapsed)",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        })
    }
}

impl JobObserver for ProgressRender {
    fn on_unit_start(&mut self, _index: usize, total: usize, unit: &WorkUnit) {
        let message = unit.to_string();
        self.bar_for(total).set_message(message);
    }

    fn on_unit_result(&mut self, unit: &WorkUnit, result: UnitResult) {
        if let Some(bar) = &self.bar {
            if result == UnitResult::Failed {
                bar.println(format!("error downloading {unit}"));
            }
            bar.inc(1);
        }
    }

    fn on_job_complete(&mut self, outcome: &JobOutcome) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        let suffix = if outcome.interrupted {
            " (interrupted)"
        } else {
            ""
        };
        println!(
            "...{} new files downloaded, {} skipped, {} failed{suffix}.",
            outcome.downloaded, outcome.skipped, outcome.failed
        );
    }
}
