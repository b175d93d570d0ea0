//! Fetch orchestrator: drives one job's work set through the backoff client

use crate::address::{Addresser, WorkUnit};
use crate::coords::{self, CoordsError};
use crate::downloader::job::{Coverage, JobOutcome, JobSpec, RunTally};
use crate::downloader::observer::{JobObserver, LogObserver, UnitResult};
use crate::downloader::pacing::RestSchedule;
use crate::downloader::DownloadError;
use crate::fetcher::{BackoffClient, BackoffPolicy, BackoffState, FetchError, FetchOutcome};
use crate::output::AuditLog;
use crate::shutdown::{self, SharedShutdown};
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Sequential batch-download orchestrator.
///
/// Enumerates a job's work units in deterministic order, skips units whose
/// output file already exists, fetches the rest through the adaptive
/// backoff client, writes bytes to the layout the addresser dictates, and
/// paces requests with the shared wait time plus (for tiles) the periodic
/// rest schedule. Per-unit failures are counted and swallowed; the loop
/// always moves on to the next unit.
pub struct FetchOrchestrator {
    client: BackoffClient,
    addresser: Addresser,
    rest: RestSchedule,
    observer: Box<dyn JobObserver>,
    shutdown: Option<SharedShutdown>,
}

impl FetchOrchestrator {
    /// Create an orchestrator fetching with `policy` and authenticating
    /// with `api_key`. Picks up the globally registered shutdown handle,
    /// if any.
    pub fn new(policy: BackoffPolicy, api_key: impl Into<String>) -> Result<Self, DownloadError> {
        Ok(Self {
            client: BackoffClient::new(policy)?,
            addresser: Addresser::new(api_key),
            rest: RestSchedule::default(),
            observer: Box::new(LogObserver),
            shutdown: shutdown::get_global_shutdown(),
        })
    }

    /// Point requests at a different API host (tests use a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.addresser = self.addresser.with_base_url(base_url);
        self
    }

    /// Replace the progress observer.
    pub fn with_observer(mut self, observer: Box<dyn JobObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Attach a shutdown handle checked between units.
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Replace the periodic rest schedule applied to tile jobs.
    pub fn with_rest_schedule(mut self, rest: RestSchedule) -> Self {
        self.rest = rest;
        self
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|s| s.is_requested())
    }

    /// Sleep for `duration`, waking early if shutdown is requested.
    /// Returns true when the sleep was cut short.
    async fn pause(&self, duration: Duration) -> bool {
        match &self.shutdown {
            Some(shutdown) => tokio::select! {
                _ = sleep(duration) => false,
                _ = shutdown.wait_requested() => true,
            },
            None => {
                sleep(duration).await;
                false
            }
        }
    }

    /// Run one job to completion (or graceful interruption).
    ///
    /// An out-of-bounds tile rectangle is reported and yields an empty
    /// outcome, not an error: the job is a no-op, the run continues.
    pub async fn run_job(
        &mut self,
        job: &JobSpec,
        state: &mut BackoffState,
        tally: &mut RunTally,
    ) -> Result<JobOutcome, DownloadError> {
        let mut outcome = JobOutcome::default();

        let (units, out_dir, is_tile_job) = match job {
            JobSpec::Tiles(tile_job) => {
                let coords = match &tile_job.coverage {
                    Coverage::FullGrid => coords::full_grid(tile_job.zoom),
                    Coverage::Bounds(bounds) => {
                        match coords::tile_coords_in_bounds(bounds, tile_job.zoom, tile_job.clamp)
                        {
                            Ok(coords) => coords,
                            Err(e @ CoordsError::OutOfBounds { .. }) => {
                                warn!(zoom = tile_job.zoom, error = %e, "no tiles to download");
                                self.observer.on_job_complete(&outcome);
                                tally.finish_job();
                                return Ok(outcome);
                            }
                        }
                    }
                };
                let units: Vec<WorkUnit> = coords
                    .into_iter()
                    .map(|c| WorkUnit::Tile {
                        map_type: tile_job.map_type,
                        zoom: tile_job.zoom,
                        x: c.x,
                        y: c.y,
                    })
                    .collect();
                (units, tile_job.out_dir.as_path(), true)
            }
            JobSpec::Fonts(font_job) => {
                let units: Vec<WorkUnit> = coords::glyph_ranges()
                    .into_iter()
                    .map(|(start, end)| WorkUnit::GlyphRange {
                        font: font_job.font.clone(),
                        start,
                        end,
                    })
                    .collect();
                (units, font_job.out_dir.as_path(), false)
            }
        };

        let total = units.len();
        info!(units = total, "starting job");

        // Opened on the first attempted tile so a fully-skipped re-run
        // leaves the log untouched.
        let mut audit: Option<AuditLog> = None;
        // Counts attempted units only; skipped units consume no budget.
        let mut api_calls: u64 = 0;

        for (index, unit) in units.iter().enumerate() {
            if self.shutdown_requested() {
                info!(
                    completed = index,
                    total, "shutdown requested, stopping job early"
                );
                outcome.interrupted = true;
                break;
            }

            self.observer.on_unit_start(index, total, unit);
            let address = self.addresser.address(unit, out_dir);

            if address.path.exists() {
                outcome.skipped += 1;
                self.observer.on_unit_result(unit, UnitResult::Skipped);
                continue;
            }

            let result = match self.client.fetch(&address.url, state).await {
                Ok(FetchOutcome::Fetched(bytes)) => {
                    write_unit(&address.path, &bytes)?;
                    outcome.downloaded += 1;
                    tally.record_download();
                    UnitResult::Downloaded
                }
                Ok(FetchOutcome::NoContent) => {
                    outcome.skipped += 1;
                    UnitResult::NoContent
                }
                Err(e @ FetchError::Exhausted { .. }) => {
                    warn!(%unit, error = %e, "unit failed, continuing");
                    outcome.failed += 1;
                    UnitResult::Failed
                }
                Err(e) => return Err(e.into()),
            };
            api_calls += 1;

            if is_tile_job {
                if let WorkUnit::Tile { zoom, x, y, .. } = unit {
                    if audit.is_none() {
                        audit = Some(AuditLog::open(out_dir)?);
                    }
                    if let Some(log) = audit.as_mut() {
                        log.record(*zoom, *x, *y, result == UnitResult::Downloaded)?;
                    }
                }
            }

            self.observer.on_unit_result(unit, result);

            if index + 1 < total {
                if self.pause(state.wait()).await {
                    outcome.interrupted = true;
                    break;
                }
                if is_tile_job {
                    if let Some(rest) = self.rest.rest_after(api_calls) {
                        debug!(secs = rest.as_secs_f64(), "extended rest");
                        if self.pause(rest).await {
                            outcome.interrupted = true;
                            break;
                        }
                    }
                }
            }
        }

        if let Some(log) = audit.as_mut() {
            log.flush()?;
        }

        self.observer.on_job_complete(&outcome);
        let job_count = tally.finish_job();
        info!(
            downloaded = job_count,
            total_downloaded = tally.total_downloaded(),
            "job finished"
        );
        Ok(outcome)
    }
}

/// Write one fetched unit, creating parent directories as needed.
/// Directory creation is idempotent; the write itself is a single
/// open-write-close under the orchestrator's sequential execution.
fn write_unit(path: &Path, bytes: &[u8]) -> Result<(), DownloadError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DownloadError::Io {
            path: parent.display().to_string(),
            message: e.to_string(),
        })?;
    }
    std::fs::write(path, bytes).map_err(|e| DownloadError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
