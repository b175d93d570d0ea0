//! CLI error types and conversions

use crate::address::AddressError;
use crate::batch::BatchError;
use crate::coords::CoordsError;
use crate::downloader::DownloadError;
use crate::fetcher::FetchError;
use crate::output::OutputError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Address error
    #[error("{0}")]
    Address(#[from] AddressError),

    /// Coordinate error
    #[error("coordinate error: {0}")]
    Coords(#[from] CoordsError),

    /// Download error
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// Fetch error
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Batch config error
    #[error("{0}")]
    Batch(#[from] BatchError),

    /// Output error
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
