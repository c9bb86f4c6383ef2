//! Creation-time resolution.
//!
//! Precedence: metadata primary timestamp, metadata original timestamp, a date in the
//! file name, and finally the filesystem's status-change (Unix) or creation (Windows) time.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDateTime};
use tracing::{debug, warn};

use crate::errors::SortError;
use crate::fs_ops::fs_error;
use crate::media::{MediaMetadata, TIMESTAMP_FORMAT};
use crate::platform;

/// Where a creation time came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrigin {
    Metadata,
    OriginalMetadata,
    FileName,
    Filesystem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDate {
    pub creation: NaiveDateTime,
    pub origin: DateOrigin,
    /// A metadata timestamp was present but unparseable; the file should be corrected.
    pub metadata_invalid: bool,
}

fn parse_timestamp(path: &Path, raw: &str) -> Result<NaiveDateTime, SortError> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).map_err(|_| {
        SortError::InvalidDateFormat {
            path: path.to_path_buf(),
            value: raw.to_string(),
        }
    })
}

/// Filesystem fallback, converted to local wall-clock time.
pub fn filesystem_time(path: &Path) -> Result<NaiveDateTime, SortError> {
    let meta = fs::metadata(path).map_err(fs_error("stat", path))?;
    let local: DateTime<Local> = platform::status_change_time(&meta).into();
    Ok(local.naive_local())
}

pub fn resolve_creation(
    path: &Path,
    metadata: Option<&dyn MediaMetadata>,
    stem_date: Option<NaiveDateTime>,
) -> Result<ResolvedDate, SortError> {
    let mut metadata_invalid = false;

    if let Some(meta) = metadata.filter(|m| m.has_metadata()) {
        let fields = [
            (meta.primary_timestamp(), DateOrigin::Metadata),
            (meta.original_timestamp(), DateOrigin::OriginalMetadata),
        ];
        for (raw, origin) in fields {
            let Some(raw) = raw else { continue };
            match parse_timestamp(path, raw) {
                Ok(creation) => {
                    return Ok(ResolvedDate {
                        creation,
                        origin,
                        metadata_invalid,
                    });
                }
                Err(e) => {
                    warn!(code = e.code(), file = %path.display(), "{e}");
                    metadata_invalid = true;
                }
            }
        }
    } else if metadata.is_some() {
        debug!(file = %path.display(), "file carries no metadata block");
    }

    if let Some(creation) = stem_date {
        debug!(file = %path.display(), "creation time taken from file name");
        return Ok(ResolvedDate {
            creation,
            origin: DateOrigin::FileName,
            metadata_invalid,
        });
    }

    debug!(file = %path.display(), "creation time taken from filesystem");
    Ok(ResolvedDate {
        creation: filesystem_time(path)?,
        origin: DateOrigin::Filesystem,
        metadata_invalid,
    })
}
