//! Output writers

pub mod audit;

pub use audit::AuditLog;

/// Output errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
