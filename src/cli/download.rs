//! Download command implementations

use crate::address::{slug_font_name, MapType};
use crate::batch::{self, MAX_ZOOM};
use crate::cli::progress::ProgressRender;
use crate::coords::BoundingBox;
use crate::downloader::{FetchOrchestrator, FontJob, JobSpec, RunTally, TileJob};
use crate::fetcher::{BackoffPolicy, BackoffState};
use crate::shutdown::SharedShutdown;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::CliError;

/// Placeholder credential matching the public MapTiler documentation; real
/// runs must supply their own key.
const DEFAULT_API_KEY: &str = "get_your_own_OpIi9ZULNHzrESv6T2vL";

const DEFAULT_FONTS: [&str; 3] = ["noto-sans-regular", "noto-sans-italic", "noto-sans-bold"];

/// Download MapTiler map tiles and font glyph ranges.
#[derive(Parser, Debug)]
#[command(name = "map-tile-downloader", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download map tiles for one zoom level
    Tiles(TilesArgs),
    /// Download complete font stacks (256 glyph ranges each)
    Fonts(FontsArgs),
    /// Run several tile jobs from a CSV batch config
    Batch(BatchArgs),
}

/// Result of a whole run, for the final summary line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    /// New files downloaded across all jobs, including a partial job.
    pub total_downloaded: u64,
    /// Whether the run stopped on a shutdown request.
    pub interrupted: bool,
}

/// Arguments for the `tiles` subcommand.
#[derive(Args, Debug)]
pub struct TilesArgs {
    /// Directory to save tiles
    pub dir: PathBuf,

    /// Map type (satellite, terrain, contours, v3, or an alias)
    pub map_type: String,

    /// Zoom level
    #[arg(value_parser = clap::value_parser!(u8).range(0..=MAX_ZOOM as i64))]
    pub zoom: u8,

    /// Minimum longitude of the bounding box
    #[arg(long, allow_negative_numbers = true)]
    pub minlon: Option<f64>,

    /// Minimum latitude of the bounding box
    #[arg(long, allow_negative_numbers = true)]
    pub minlat: Option<f64>,

    /// Maximum longitude of the bounding box
    #[arg(long, allow_negative_numbers = true)]
    pub maxlon: Option<f64>,

    /// Maximum latitude of the bounding box
    #[arg(long, allow_negative_numbers = true)]
    pub maxlat: Option<f64>,

    /// Your MapTiler API key
    #[arg(short, long, default_value = DEFAULT_API_KEY)]
    pub key: String,
}

/// Arguments for the `fonts` subcommand.
#[derive(Args, Debug)]
pub struct FontsArgs {
    /// Your MapTiler API key
    #[arg(short, long, default_value = DEFAULT_API_KEY)]
    pub key: String,

    /// Directory to save downloaded font files
    #[arg(short, long, default_value = "./fonts")]
    pub dir: PathBuf,

    /// Font stack name(s) to download (e.g. 'Noto Sans Bold')
    #[arg(short, long, num_args = 1..)]
    pub fonts: Vec<String>,
}

/// Arguments for the `batch` subcommand.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Directory to save tiles
    pub dir: PathBuf,

    /// Map type (satellite, terrain, contours, v3, or an alias)
    pub map_type: String,

    /// CSV batch config with header zoom,minlon,minlat,maxlon,maxlat
    pub config: PathBuf,

    /// Your MapTiler API key
    #[arg(short, long, default_value = DEFAULT_API_KEY)]
    pub key: String,
}

/// Create the output directory if missing and verify it is writable.
fn ensure_writable_dir(dir: &Path) -> Result<(), CliError> {
    if !dir.exists() {
        info!(dir = %dir.display(), "output directory does not exist, creating it");
    }
    std::fs::create_dir_all(dir).map_err(|e| {
        CliError::InvalidArgument(format!("cannot create directory {}: {e}", dir.display()))
    })?;
    let metadata = std::fs::metadata(dir).map_err(|e| {
        CliError::InvalidArgument(format!("cannot access directory {}: {e}", dir.display()))
    })?;
    if metadata.permissions().readonly() {
        return Err(CliError::InvalidArgument(format!(
            "directory {} is not writable",
            dir.display()
        )));
    }
    Ok(())
}

/// Interpret the four optional bounding-box flags: all four make a
/// bounding box, none makes a full-grid job, anything in between is an
/// error.
fn parse_bounds(
    minlon: Option<f64>,
    minlat: Option<f64>,
    maxlon: Option<f64>,
    maxlat: Option<f64>,
) -> Result<Option<BoundingBox>, CliError> {
    match (minlon, minlat, maxlon, maxlat) {
        (Some(min_lon), Some(min_lat), Some(max_lon), Some(max_lat)) => Ok(Some(BoundingBox {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })),
        (None, None, None, None) => Ok(None),
        _ => Err(CliError::InvalidArgument(
            "bounding box requires all of --minlon, --minlat, --maxlon, --maxlat".to_string(),
        )),
    }
}

fn build_orchestrator(
    api_key: &str,
    shutdown: SharedShutdown,
) -> Result<FetchOrchestrator, CliError> {
    Ok(FetchOrchestrator::new(BackoffPolicy::default(), api_key)?
        .with_observer(Box::new(ProgressRender::new()))
        .with_shutdown(shutdown))
}

/// Run a sequence of jobs, stopping early on shutdown. The backoff state
/// persists across jobs; the tally folds per-job counts into the run
/// total.
async fn run_jobs(
    orchestrator: &mut FetchOrchestrator,
    jobs: &[JobSpec],
) -> Result<RunSummary, CliError> {
    let policy = BackoffPolicy::default();
    let mut state = BackoffState::new(&policy);
    let mut tally = RunTally::new();
    let mut interrupted = false;

    for job in jobs {
        let outcome = orchestrator.run_job(job, &mut state, &mut tally).await?;
        if outcome.interrupted {
            warn!("run interrupted, reporting partial totals");
            interrupted = true;
            break;
        }
    }

    Ok(RunSummary {
        total_downloaded: tally.total_downloaded(),
        interrupted,
    })
}

impl TilesArgs {
    pub async fn execute(&self, shutdown: SharedShutdown) -> Result<RunSummary, CliError> {
        let map_type: MapType = self.map_type.parse()?;
        ensure_writable_dir(&self.dir)?;

        let job = match parse_bounds(self.minlon, self.minlat, self.maxlon, self.maxlat)? {
            Some(bounds) => TileJob::bounded(map_type, self.zoom, bounds, &self.dir),
            None => TileJob::full_grid(map_type, self.zoom, &self.dir),
        };

        let mut orchestrator = build_orchestrator(&self.key, shutdown)?;
        run_jobs(&mut orchestrator, &[JobSpec::Tiles(job)]).await
    }
}

impl FontsArgs {
    pub async fn execute(&self, shutdown: SharedShutdown) -> Result<RunSummary, CliError> {
        ensure_writable_dir(&self.dir)?;

        let fonts: Vec<String> = if self.fonts.is_empty() {
            DEFAULT_FONTS.iter().map(|f| f.to_string()).collect()
        } else {
            self.fonts.iter().map(|f| slug_font_name(f)).collect()
        };

        let jobs: Vec<JobSpec> = fonts
            .into_iter()
            .map(|font| JobSpec::Fonts(FontJob::new(font, &self.dir)))
            .collect();

        let mut orchestrator = build_orchestrator(&self.key, shutdown)?;
        run_jobs(&mut orchestrator, &jobs).await
    }
}

impl BatchArgs {
    pub async fn execute(&self, shutdown: SharedShutdown) -> Result<RunSummary, CliError> {
        let map_type: MapType = self.map_type.parse()?;
        ensure_writable_dir(&self.dir)?;

        let entries = batch::load_batch(&self.config)?;
        if entries.is_empty() {
            warn!(config = %self.config.display(), "batch config contains no usable rows");
        }

        let jobs: Vec<JobSpec> = entries
            .into_iter()
            .map(|entry| {
                JobSpec::Tiles(TileJob::bounded(
                    map_type,
                    entry.zoom,
                    entry.bounds,
                    &self.dir,
                ))
            })
            .collect();

        let mut orchestrator = build_orchestrator(&self.key, shutdown)?;
        run_jobs(&mut orchestrator, &jobs).await
    }
}
