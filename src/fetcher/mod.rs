//! HTTP fetching with adaptive backoff
//!
//! One network call at a time, every call governed by a shared, mutable
//! wait-time scalar that grows on failure and shrinks on success. See
//! [`backoff::BackoffClient`] for the retry protocol.

use bytes::Bytes;

pub mod backoff;

pub use backoff::{BackoffClient, BackoffPolicy, BackoffState};

/// Fetch errors
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Failed to construct the HTTP client
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// All retries exhausted without a successful response
    #[error("gave up after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },
}

/// Result type for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Terminal outcome of one fetch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// HTTP 200: the response body.
    Fetched(Bytes),
    /// HTTP 204: the server has nothing for this resource (font ranges
    /// with no glyphs). Terminal, never retried, wait time untouched.
    NoContent,
}
