//! Per-file state owned by one worker.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::errors::SortError;
use crate::hash::{ContentDigest, digest_file};
use crate::media::ContentType;
use crate::naming::grammar::{DateMatch, Marker, extract_date, split_marker};

/// What the grammars found in a file stem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StemParts {
    /// Text before the date; empty without a date
    pub prefix: String,
    /// Text after the date with any conflict marker removed; empty without a date
    pub suffix: String,
    /// The stem minus the recovered marker
    pub cleaned_stem: String,
    pub date_in_stem: bool,
    /// Date encoded in the stem, when it is a real calendar date
    pub date: Option<NaiveDateTime>,
    /// Ordinal recovered from an existing marker
    pub prior_conflicts: u32,
}

impl StemParts {
    pub fn parse(stem: &str) -> Self {
        let Some(found) = extract_date(stem) else {
            return StemParts {
                cleaned_stem: stem.to_string(),
                ..Default::default()
            };
        };

        // A time group may run into the digits of a trailing `-hash` marker when the
        // pattern renders no seconds. Re-read the date without the marker then.
        let date_end = stem.len() - found.suffix.len();
        let (unrelated, marker) = split_marker(stem);
        if marker.hash
            && date_end > unrelated.len()
            && let Some(inner) = extract_date(unrelated)
        {
            return Self::with_marker(&inner, inner.suffix, unrelated, marker);
        }

        let (suffix, marker) = split_marker(found.suffix);
        let marker_start = stem.len() - (found.suffix.len() - suffix.len());
        Self::with_marker(&found, suffix, &stem[..marker_start], marker)
    }

    fn with_marker(found: &DateMatch<'_>, suffix: &str, cleaned: &str, marker: Marker) -> Self {
        StemParts {
            prefix: found.prefix.to_string(),
            suffix: suffix.to_string(),
            cleaned_stem: cleaned.to_string(),
            date_in_stem: true,
            date: found.to_datetime(),
            prior_conflicts: marker.ordinal(),
        }
    }
}

/// Immutable description of a media file under consideration.
/// The content digest is computed on first use and then reused.
#[derive(Debug)]
pub struct FileRecord {
    source: PathBuf,
    content_type: ContentType,
    creation: NaiveDateTime,
    stem: StemParts,
    extension: String,
    digest: OnceCell<ContentDigest>,
    prior_digest: Option<ContentDigest>,
}

impl FileRecord {
    pub fn new(
        source: impl Into<PathBuf>,
        content_type: ContentType,
        creation: NaiveDateTime,
        stem: StemParts,
    ) -> Self {
        let source = source.into();
        let extension = source
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        Self {
            source,
            content_type,
            creation,
            stem,
            extension,
            digest: OnceCell::new(),
            prior_digest: None,
        }
    }

    /// Digest of the bytes as they were before a metadata rewrite.
    pub fn with_prior_digest(mut self, digest: ContentDigest) -> Self {
        self.prior_digest = Some(digest);
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn creation(&self) -> NaiveDateTime {
        self.creation
    }

    pub fn stem(&self) -> &StemParts {
        &self.stem
    }

    pub fn prior_conflicts(&self) -> u32 {
        self.stem.prior_conflicts
    }

    /// Lower-case extension without the dot; may be empty.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn prior_digest(&self) -> Option<ContentDigest> {
        self.prior_digest
    }

    pub fn digest(&self) -> Result<ContentDigest, SortError> {
        if let Some(d) = self.digest.get() {
            return Ok(*d);
        }
        let d = digest_file(&self.source)?;
        let _ = self.digest.set(d);
        Ok(d)
    }

    /// True when `other` equals the current or the pre-rewrite digest.
    pub fn same_content(&self, other: ContentDigest) -> Result<bool, SortError> {
        Ok(self.digest()? == other || self.prior_digest == Some(other))
    }
}
