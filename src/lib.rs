//! # Map Tile Downloader Library
//!
//! A resilient, resumable batch downloader for MapTiler-style map tiles
//! and font glyph ranges. Designed for mirroring tile sets and font stacks
//! onto local disk in the exact layout tile servers expect.
//!
//! ## Features
//!
//! - **Deterministic addressing**: Web-Mercator slippy-tile math maps
//!   coordinates and glyph ranges onto exactly one URL and one local path
//! - **Adaptive backoff**: a single wait-time scalar shared across the
//!   whole run grows on failure and shrinks on success, adapting to
//!   sustained server throttling
//! - **Resumability**: units whose output file already exists are skipped,
//!   so interrupted runs pick up where they left off
//! - **Pacing**: fixed inter-request delays plus a hierarchical periodic
//!   rest schedule for long tile batches
//! - **Graceful shutdown**: Ctrl+C stops the loop between units and
//!   reports accurate partial totals
//!
//! ## Quick Start
//!
//! ```no_run
//! use map_tile_downloader::address::MapType;
//! use map_tile_downloader::downloader::{FetchOrchestrator, JobSpec, RunTally, TileJob};
//! use map_tile_downloader::fetcher::{BackoffPolicy, BackoffState};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = BackoffPolicy::default();
//! let mut orchestrator = FetchOrchestrator::new(policy, "my-api-key")?;
//!
//! let job = JobSpec::Tiles(TileJob::full_grid(MapType::Satellite, 2, "./tiles"));
//! let mut state = BackoffState::new(&policy);
//! let mut tally = RunTally::new();
//!
//! let outcome = orchestrator.run_job(&job, &mut state, &mut tally).await?;
//! println!("downloaded {} tiles", outcome.downloaded);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`coords`] - Web-Mercator tile math and glyph range enumeration
//! - [`address`] - work units and their URL/path addressing
//! - [`fetcher`] - HTTP client with adaptive backoff retries
//! - [`downloader`] - batch orchestration, pacing, outcomes
//! - [`output`] - CSV audit log
//! - [`batch`] - batch config file loading
//! - [`shutdown`] - cooperative Ctrl+C handling

pub mod address;
pub mod batch;
pub mod cli;
pub mod coords;
pub mod downloader;
pub mod fetcher;
pub mod output;
pub mod shutdown;

pub use address::{Addresser, MapType, ResourceAddress, WorkUnit};
pub use coords::{BoundingBox, LatitudeClamp, TileCoord};
pub use downloader::{
    Coverage, FetchOrchestrator, FontJob, JobOutcome, JobSpec, RunTally, TileJob,
};
pub use fetcher::{BackoffClient, BackoffPolicy, BackoffState, FetchOutcome};
