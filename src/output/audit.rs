//! CSV audit log for tile downloads
//!
//! Appends one row per attempted (non-skipped) tile to
//! `tile_download.csv` inside the tile output directory. The header
//! `z,x,y,status` is written once, only when the file is new, so repeated
//! runs against the same directory keep appending to a single log.

use csv::WriterBuilder;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::debug;

use super::{OutputError, OutputResult};

/// Audit log filename inside the tile output directory.
pub const AUDIT_FILENAME: &str = "tile_download.csv";

#[derive(Debug, Serialize)]
struct AuditRecord {
    z: u8,
    x: u32,
    y: u32,
    /// 1 for downloaded, 0 for failed.
    status: u8,
}

/// Append-aware CSV audit writer.
pub struct AuditLog {
    writer: csv::Writer<std::fs::File>,
}

impl AuditLog {
    /// Open (or create) the audit log inside `out_dir`.
    pub fn open(out_dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(out_dir)
            .map_err(|e| OutputError::Io(format!("failed to create {}: {e}", out_dir.display())))?;
        let path = out_dir.join(AUDIT_FILENAME);
        let is_new = !path.exists();

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|e| OutputError::Io(format!("failed to open {}: {e}", path.display())))?;

        // Serialization never emits headers itself; the header line is
        // written manually exactly once, when the file is created.
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if is_new {
            writer
                .write_record(["z", "x", "y", "status"])
                .map_err(|e| OutputError::Csv(e.to_string()))?;
            debug!(path = %path.display(), "created audit log");
        } else {
            debug!(path = %path.display(), "appending to existing audit log");
        }

        Ok(Self { writer })
    }

    /// Record one attempted tile: `downloaded` maps to status 1/0.
    pub fn record(&mut self, z: u8, x: u32, y: u32, downloaded: bool) -> OutputResult<()> {
        self.writer
            .serialize(AuditRecord {
                z,
                x,
                y,
                status: u8::from(downloaded),
            })
            .map_err(|e| OutputError::Csv(e.to_string()))
    }

    /// Flush buffered rows to disk.
    pub fn flush(&mut self) -> OutputResult<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::Io(e.to_string()))
    }
}
