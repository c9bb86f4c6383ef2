//! Typed error definitions for media_sort.
//! Every variant is scoped to a single file or to startup; none of them aborts a run
//! once workers have been dispatched.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SortError {
    #[error("Metadata unreadable for {path}: {reason}")]
    UnreadableMetadata { path: PathBuf, reason: String },

    #[error("Invalid timestamp '{value}' in {path}")]
    InvalidDateFormat { path: PathBuf, value: String },

    #[error("Unrecognized extension: {0}")]
    UnrecognizedExtension(PathBuf),

    #[error("No free name for {file} after {attempts} attempts (last tried {last})")]
    CollisionExhausted {
        file: PathBuf,
        last: PathBuf,
        attempts: u32,
    },

    #[error("{message}")]
    Filesystem {
        message: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Operation interrupted by user")]
    Interrupted,
}

impl SortError {
    /// Stable identifier for structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            SortError::UnreadableMetadata { .. } => "unreadable_metadata",
            SortError::InvalidDateFormat { .. } => "invalid_date_format",
            SortError::UnrecognizedExtension(_) => "unrecognized_extension",
            SortError::CollisionExhausted { .. } => "collision_exhausted",
            SortError::Filesystem { .. } => "filesystem",
            SortError::InvalidPattern { .. } => "invalid_pattern",
            SortError::Interrupted => "interrupted",
        }
    }

    /// True when the underlying I/O failure was a missing path.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SortError::Filesystem { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
