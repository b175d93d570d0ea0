//! Batch download orchestration
//!
//! The orchestrator drives many fetch calls over one job's work set:
//!
//! 1. **Job description**: what to download, via [`job::JobSpec`]
//! 2. **Enumeration**: tile rectangles or glyph ranges, in deterministic
//!    order
//! 3. **Resumability**: units whose output file already exists are skipped
//!    (presence alone is authoritative, no checksum)
//! 4. **Fetching**: every network call goes through the shared
//!    [`crate::fetcher::BackoffClient`]
//! 5. **Pacing**: the adaptive wait time separates consecutive units, and
//!    tile jobs layer the hierarchical rest schedule of [`pacing`] on top
//!
//! Per-unit failures are swallowed and counted; only structural errors
//! (unwritable output, broken config) abort a run.

pub mod executor;
pub mod job;
pub mod observer;
pub mod pacing;

pub use executor::FetchOrchestrator;
pub use job::{Coverage, FontJob, JobOutcome, JobSpec, RunTally, TileJob};
pub use observer::{JobObserver, LogObserver, UnitResult};

use crate::coords::CoordsError;
use crate::fetcher::FetchError;
use crate::output::OutputError;

/// Download errors
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// Coordinate error
    #[error("coordinate error: {0}")]
    Coords(#[from] CoordsError),

    /// Fetch error
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Output error
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// IO error writing a fetched unit
    #[error("IO error for {path}: {message}")]
    Io { path: String, message: String },
}
