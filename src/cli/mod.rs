//! CLI command implementations

pub mod download;
pub mod error;
pub mod progress;

pub use download::{Cli, Commands, RunSummary};
pub use error::CliError;
pub use progress::ProgressRender;
