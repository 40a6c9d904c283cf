use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The host configuration could not be read at all. Fatal for the run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ssh config not found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read ssh config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A single configuration line that was skipped.
///
/// Never fatal; the parser logs it and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedLine {
    #[error("'{0}' is missing a value")]
    MissingValue(String),
    #[error("'{0}' is not a valid port")]
    InvalidPort(String),
    #[error("'{0}' is a host pattern, not a concrete host")]
    Pattern(String),
}
