//! Work done for one enumerated file: classify, date, name, resolve, apply.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{debug, error, info, warn};

use crate::dates::resolve_creation;
use crate::errors::SortError;
use crate::fs_ops;
use crate::hash::{ContentDigest, digest_file};
use crate::media::{ContentType, MediaMetadata, MetadataReader, TIMESTAMP_FORMAT};
use crate::naming::NameComposer;
use crate::record::{FileRecord, StemParts};
use crate::registry::ClaimRegistry;
use crate::resolver::{ConflictResolver, MAX_ORDINAL, Resolution};
use crate::shutdown;

/// Final disposition of one file. In dry-run these describe what would have happened.
#[derive(Debug)]
pub enum Outcome {
    Renamed { from: PathBuf, to: PathBuf },
    InPlace(PathBuf),
    Duplicate { removed: PathBuf, of: PathBuf },
    Deferred { source: PathBuf, target: PathBuf },
    Exhausted { source: PathBuf, last: PathBuf },
    Pruned(PathBuf),
    Skipped(PathBuf),
    Failed { path: PathBuf, error: SortError },
    Interrupted(PathBuf),
}

/// Shared, read-only context handed to every worker.
pub struct FileProcessor<'a> {
    pub composer: &'a NameComposer,
    pub registry: &'a ClaimRegistry,
    pub reader: &'a dyn MetadataReader,
    pub prune: bool,
    pub replace: bool,
    pub dry_run: bool,
}

impl FileProcessor<'_> {
    pub fn process(&self, path: &Path) -> Outcome {
        if shutdown::is_requested() {
            return Outcome::Interrupted(path.to_path_buf());
        }
        match self.process_inner(path) {
            Ok(outcome) => outcome,
            Err(error) => {
                error!(code = error.code(), file = %path.display(), "{error}");
                Outcome::Failed {
                    path: path.to_path_buf(),
                    error,
                }
            }
        }
    }

    fn process_inner(&self, path: &Path) -> Result<Outcome, SortError> {
        let Some(content_type) = ContentType::from_path(path) else {
            return self.unrecognized(path);
        };

        let mut metadata = match self.reader.read(path) {
            Ok(m) => m,
            Err(e) => {
                warn!(code = e.code(), file = %path.display(), "{e}; continuing without metadata");
                None
            }
        };

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parts = StemParts::parse(&stem);
        let resolved = resolve_creation(path, metadata.as_deref(), parts.date)?;

        let mut prior_digest = None;
        if resolved.metadata_invalid
            && let Some(meta) = metadata.as_deref_mut()
        {
            prior_digest = self.correct_metadata(path, meta, resolved.creation)?;
        }

        let mut record = FileRecord::new(path, content_type, resolved.creation, parts);
        if let Some(d) = prior_digest {
            record = record.with_prior_digest(d);
        }

        let resolver = ConflictResolver::new(self.composer, self.registry, self.replace);
        let resolution = resolver.resolve(&record)?;
        self.apply(path, resolution)
    }

    fn unrecognized(&self, path: &Path) -> Result<Outcome, SortError> {
        let reason = SortError::UnrecognizedExtension(path.to_path_buf());
        if !self.prune {
            info!(code = reason.code(), "{reason}");
            return Ok(Outcome::Skipped(path.to_path_buf()));
        }
        if self.dry_run {
            info!(file = %path.display(), "would remove (unrecognized)");
        } else {
            fs_ops::remove_file(path)?;
            info!(file = %path.display(), "removed (unrecognized)");
        }
        Ok(Outcome::Pruned(path.to_path_buf()))
    }

    /// Rewrite both timestamp fields to `creation`. Returns the digest of the bytes before
    /// the rewrite, so copies made before the fix still count as duplicates.
    fn correct_metadata(
        &self,
        path: &Path,
        meta: &mut dyn MediaMetadata,
        creation: NaiveDateTime,
    ) -> Result<Option<ContentDigest>, SortError> {
        let fixed = creation.format(TIMESTAMP_FORMAT).to_string();
        if !meta.can_rewrite() {
            warn!(
                file = %path.display(),
                to = %fixed,
                "metadata timestamp is invalid but this format is read only"
            );
            return Ok(None);
        }
        if self.dry_run {
            info!(
                file = %path.display(),
                from = meta.primary_timestamp().or(meta.original_timestamp()).unwrap_or(""),
                to = %fixed,
                "would fix metadata timestamp"
            );
            return Ok(None);
        }
        let before = digest_file(path)?;
        meta.set_timestamps(&fixed);
        let bytes = meta.to_bytes()?;
        fs_ops::write_replacing(path, &bytes)?;
        info!(file = %path.display(), to = %fixed, "fixed metadata timestamp");
        Ok(Some(before))
    }

    fn apply(&self, path: &Path, resolution: Resolution) -> Result<Outcome, SortError> {
        let source = path.to_path_buf();
        match resolution {
            Resolution::InPlace(p) => {
                debug!(file = %p.display(), "already in place");
                Ok(Outcome::InPlace(p))
            }
            Resolution::Move { target, replace } => {
                if self.dry_run {
                    info!(src = %path.display(), dest = %target.display(), replace, "would rename");
                    return Ok(Outcome::Renamed { from: source, to: target });
                }
                if let Err(e) = fs_ops::move_file(path, &target) {
                    self.registry.release(&target);
                    return Err(e);
                }
                self.registry.mark_placed(&target);
                info!(src = %path.display(), dest = %target.display(), replace, "renamed");
                Ok(Outcome::Renamed { from: source, to: target })
            }
            Resolution::Duplicate { of } => {
                if self.dry_run {
                    info!(src = %path.display(), of = %of.display(), "would remove duplicate");
                } else {
                    fs_ops::remove_file(path)?;
                    info!(src = %path.display(), of = %of.display(), "removed duplicate");
                }
                Ok(Outcome::Duplicate { removed: source, of })
            }
            Resolution::Deferred { target } => {
                warn!(src = %path.display(), dest = %target.display(), "collision left for manual resolution");
                Ok(Outcome::Deferred { source, target })
            }
            Resolution::Exhausted { last } => {
                let e = SortError::CollisionExhausted {
                    file: source.clone(),
                    last: last.clone(),
                    attempts: MAX_ORDINAL + 1,
                };
                error!(code = e.code(), severity = "critical", "{e}");
                Ok(Outcome::Exhausted { source, last })
            }
        }
    }
}
