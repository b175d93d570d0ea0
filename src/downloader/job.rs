//! Job specifications, outcomes, and run-level tally

use crate::address::MapType;
use crate::coords::{BoundingBox, LatitudeClamp};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which part of the tile grid a tile job covers.
///
/// Full-grid coverage is an explicit variant rather than a sentinel bounds
/// value, so no floating-point equality is ever involved in the decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coverage {
    /// The entire `2^z x 2^z` grid.
    FullGrid,
    /// The inclusive tile rectangle covering a geographic bounding box.
    Bounds(BoundingBox),
}

/// One tile download job: one layer, one zoom level, one coverage area.
#[derive(Debug, Clone)]
pub struct TileJob {
    pub map_type: MapType,
    pub zoom: u8,
    pub coverage: Coverage,
    pub out_dir: PathBuf,
    /// Latitude clamp preset used when projecting bounding-box corners.
    pub clamp: LatitudeClamp,
}

impl TileJob {
    /// Full-grid job with the legacy clamp the tile tool historically used.
    pub fn full_grid(map_type: MapType, zoom: u8, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            map_type,
            zoom,
            coverage: Coverage::FullGrid,
            out_dir: out_dir.into(),
            clamp: LatitudeClamp::Legacy,
        }
    }

    /// Bounded job covering `bounds` at `zoom`.
    pub fn bounded(
        map_type: MapType,
        zoom: u8,
        bounds: BoundingBox,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            map_type,
            zoom,
            coverage: Coverage::Bounds(bounds),
            out_dir: out_dir.into(),
            clamp: LatitudeClamp::Legacy,
        }
    }

    /// Select a latitude clamp preset.
    pub fn with_clamp(mut self, clamp: LatitudeClamp) -> Self {
        self.clamp = clamp;
        self
    }
}

/// One font download job: all 256 glyph ranges of one font stack.
#[derive(Debug, Clone)]
pub struct FontJob {
    /// Slugged stack name (e.g. `noto-sans-bold`).
    pub font: String,
    pub out_dir: PathBuf,
}

impl FontJob {
    pub fn new(font: impl Into<String>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            font: font.into(),
            out_dir: out_dir.into(),
        }
    }
}

/// One unit of orchestrator work.
#[derive(Debug, Clone)]
pub enum JobSpec {
    Tiles(TileJob),
    Fonts(FontJob),
}

/// Counts aggregated over one job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutcome {
    /// Units fetched and written this job.
    pub downloaded: u64,
    /// Units skipped: output file already present, or 204 no-content.
    pub skipped: u64,
    /// Units that exhausted their retries.
    pub failed: u64,
    /// Whether a shutdown request stopped the job early. Files written
    /// before the stop stay on disk and the counts above stay accurate.
    pub interrupted: bool,
}

impl JobOutcome {
    /// Total units this job attempted or skipped.
    pub fn total(&self) -> u64 {
        self.downloaded + self.skipped + self.failed
    }
}

/// Run-level download tally.
///
/// The per-job counter resets between jobs; the run total only grows. The
/// backoff wait time deliberately does not live here: it persists across
/// jobs inside [`crate::fetcher::BackoffState`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    downloaded_this_job: u64,
    total_downloaded: u64,
}

impl RunTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successful download in the current job.
    pub fn record_download(&mut self) {
        self.downloaded_this_job += 1;
    }

    /// Fold the current job's count into the run total and reset it.
    /// Returns the finished job's count.
    pub fn finish_job(&mut self) -> u64 {
        let count = self.downloaded_this_job;
        self.total_downloaded += count;
        self.downloaded_this_job = 0;
        count
    }

    /// Downloads recorded in the job currently running.
    pub fn downloaded_this_job(&self) -> u64 {
        self.downloaded_this_job
    }

    /// Downloads accumulated over the whole run, including the partial
    /// count of an interrupted job once folded.
    pub fn total_downloaded(&self) -> u64 {
        self.total_downloaded
    }
}
