//! Run orchestration.
//! Enumerates inputs, prunes the destination, seeds overlap state, fans files out to a
//! fixed rayon pool and folds the outcomes that come back over a channel.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::{Config, sources_overlap_destination};
use crate::fs_ops;
use crate::media::{ContentType, MetadataReader};
use crate::naming::NameComposer;
use crate::process::{FileProcessor, Outcome};
use crate::registry::ClaimRegistry;

/// Aggregate counts for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Images and videos that reached a final outcome; pruned, skipped and
    /// interrupted files are not counted
    pub processed: usize,
    pub renamed: usize,
    pub in_place: usize,
    pub duplicates: usize,
    pub deferred: usize,
    pub exhausted: usize,
    pub pruned: usize,
    pub skipped: usize,
    pub failed: usize,
    pub interrupted: usize,
    /// Targets left with distinct content waiting next to them: `target <- sources`
    pub unresolved: Vec<(PathBuf, Vec<PathBuf>)>,
}

impl RunSummary {
    fn record(&mut self, outcome: &Outcome) {
        self.processed += match outcome {
            Outcome::Pruned(_) | Outcome::Skipped(_) | Outcome::Interrupted(_) => 0,
            Outcome::Failed { path, .. } => usize::from(ContentType::from_path(path).is_some()),
            _ => 1,
        };
        match outcome {
            Outcome::Renamed { .. } => self.renamed += 1,
            Outcome::InPlace(_) => self.in_place += 1,
            Outcome::Duplicate { .. } => self.duplicates += 1,
            Outcome::Deferred { .. } => self.deferred += 1,
            Outcome::Exhausted { .. } => {
                self.exhausted += 1;
                self.deferred += 1;
            }
            Outcome::Pruned(_) => self.pruned += 1,
            Outcome::Skipped(_) => self.skipped += 1,
            Outcome::Failed { .. } => self.failed += 1,
            Outcome::Interrupted(_) => self.interrupted += 1,
        }
    }

    /// True when the process should exit non-zero.
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.exhausted > 0
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|s| s.starts_with('.'))
}

/// Regular, non-hidden files under `root`. Hidden directories are not descended;
/// the root itself is always walked.
fn walk_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        .filter_map(|res| match res {
            Ok(e) => Some(e),
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(DirEntry::into_path)
}

/// Every input file across `sources`, de-duplicated when roots nest.
pub fn enumerate_sources(sources: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for root in sources {
        for path in walk_files(root) {
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }
    files
}

/// Remove unrecognized files under the destination that no source root covers.
fn prune_destination(cfg: &Config) -> usize {
    if !cfg.destination.is_dir() {
        return 0;
    }
    let mut pruned = 0;
    for path in walk_files(&cfg.destination) {
        if cfg.sources.iter().any(|s| path.starts_with(s)) || ContentType::from_path(&path).is_some() {
            continue;
        }
        if cfg.dry_run {
            info!(file = %path.display(), "would remove (unrecognized)");
            pruned += 1;
            continue;
        }
        match fs_ops::remove_file(&path) {
            Ok(()) => {
                info!(file = %path.display(), "removed (unrecognized)");
                pruned += 1;
            }
            Err(e) => warn!(code = e.code(), "{e}"),
        }
    }
    pruned
}

/// Sort every file under the configured sources into the destination.
/// `cfg` must already have been through `config::validate_and_normalize`.
pub fn run(cfg: &Config, reader: &dyn MetadataReader) -> Result<RunSummary> {
    let composer = NameComposer::from_config(cfg)?;
    let mut summary = RunSummary::default();

    if cfg.prune {
        summary.pruned += prune_destination(cfg);
    }

    let files = enumerate_sources(&cfg.sources);
    info!(count = files.len(), "enumerated input files");

    let registry = if sources_overlap_destination(&cfg.sources, &cfg.destination) {
        debug!("sources overlap destination; tracking inputs as pending");
        ClaimRegistry::with_pending(files.iter().cloned())
    } else {
        ClaimRegistry::new()
    };

    let processor = FileProcessor {
        composer: &composer,
        registry: &registry,
        reader,
        prune: cfg.prune,
        replace: cfg.replace,
        dry_run: cfg.dry_run,
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cfg.worker_count())
        .thread_name(|i| format!("media-sort-{i}"))
        .build()
        .context("Failed to build worker pool")?;

    let (tx, rx) = mpsc::channel::<Outcome>();
    thread::scope(|scope| {
        let processor = &processor;
        let files = &files;
        let pool = &pool;
        scope.spawn(move || {
            pool.install(|| {
                files.par_iter().for_each_with(tx, |tx, path| {
                    let _ = tx.send(processor.process(path));
                });
            });
        });
        for outcome in rx {
            summary.record(&outcome);
        }
    });

    summary.unresolved = registry.unresolved();
    info!(
        processed = summary.processed,
        renamed = summary.renamed,
        duplicates = summary.duplicates,
        deferred = summary.deferred,
        pruned = summary.pruned,
        failed = summary.failed,
        "run finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SortError;
    use assert_fs::prelude::*;

    #[test]
    fn enumeration_skips_hidden_and_dedups_nested_roots() {
        let td = assert_fs::TempDir::new().unwrap();
        td.child("a.jpg").touch().unwrap();
        td.child("sub/b.jpg").touch().unwrap();
        td.child(".hidden/c.jpg").touch().unwrap();
        td.child(".d.jpg").touch().unwrap();

        let roots = vec![td.path().to_path_buf(), td.path().join("sub")];
        let mut found = enumerate_sources(&roots);
        found.sort();
        assert_eq!(found, vec![td.path().join("a.jpg"), td.path().join("sub/b.jpg")]);
    }

    #[test]
    fn exhausted_counts_as_deferred_and_failure() {
        let mut s = RunSummary::default();
        s.record(&Outcome::Exhausted {
            source: "a".into(),
            last: "b".into(),
        });
        s.record(&Outcome::Interrupted("c".into()));
        assert_eq!((s.processed, s.deferred, s.exhausted, s.interrupted), (1, 1, 1, 1));
        assert!(s.has_failures());
    }

    #[test]
    fn processed_counts_only_media_files() {
        let mut s = RunSummary::default();
        s.record(&Outcome::InPlace("a.jpg".into()));
        s.record(&Outcome::Pruned("notes.txt".into()));
        s.record(&Outcome::Skipped("notes.md".into()));
        s.record(&Outcome::Failed {
            path: "b.png".into(),
            error: SortError::UnrecognizedExtension("b.png".into()),
        });
        s.record(&Outcome::Failed {
            path: "c.txt".into(),
            error: SortError::UnrecognizedExtension("c.txt".into()),
        });
        assert_eq!(s.processed, 2);
        assert_eq!((s.pruned, s.skipped, s.failed), (1, 1, 2));
    }
}
