//! Batch config file loader
//!
//! A batch run is described by a CSV file with the header
//! `zoom,minlon,minlat,maxlon,maxlat`, one tile job per row. Malformed
//! rows are skipped with a diagnostic; a missing or wrong header fails
//! the whole load, since the file is then structurally suspect.

use crate::coords::BoundingBox;
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// Expected header columns, in order.
pub const BATCH_HEADER: [&str; 5] = ["zoom", "minlon", "minlat", "maxlon", "maxlat"];

/// Highest zoom level the API serves.
pub const MAX_ZOOM: u8 = 22;

/// Batch config errors
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Config file missing or unreadable
    #[error("cannot read batch config {path}: {message}")]
    Unreadable { path: String, message: String },

    /// Header row is missing or has the wrong columns
    #[error("bad batch config header: expected {expected}, found {found}")]
    BadHeader { expected: String, found: String },
}

#[derive(Debug, Deserialize)]
struct BatchRow {
    zoom: u8,
    minlon: f64,
    minlat: f64,
    maxlon: f64,
    maxlat: f64,
}

/// One row of the batch config: a zoom level and its bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchEntry {
    pub zoom: u8,
    pub bounds: BoundingBox,
}

/// Load a batch config file into an ordered job list.
///
/// Rows that fail to parse, or carry a zoom outside `[0, MAX_ZOOM]`, are
/// skipped with a warning and do not abort the load.
pub fn load_batch(path: &Path) -> Result<Vec<BatchEntry>, BatchError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| BatchError::Unreadable {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let headers = reader.headers().map_err(|e| BatchError::Unreadable {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    if headers.iter().collect::<Vec<_>>() != BATCH_HEADER {
        return Err(BatchError::BadHeader {
            expected: BATCH_HEADER.join(","),
            found: headers.iter().collect::<Vec<_>>().join(","),
        });
    }

    let mut entries = Vec::new();
    for (line, record) in reader.deserialize::<BatchRow>().enumerate() {
        // Header is line 1; data starts at line 2.
        let line = line + 2;
        match record {
            Ok(row) if row.zoom > MAX_ZOOM => {
                warn!(line, zoom = row.zoom, "skipping row: zoom exceeds {MAX_ZOOM}");
            }
            Ok(row) => entries.push(BatchEntry {
                zoom: row.zoom,
                bounds: BoundingBox {
                    min_lon: row.minlon,
                    min_lat: row.minlat,
                    max_lon: row.maxlon,
                    max_lat: row.maxlat,
                },
            }),
            Err(e) => {
                warn!(line, error = %e, "skipping malformed batch config row");
            }
        }
    }
    Ok(entries)
}
