//! Run-wide registry of claimed target paths.
//!
//! A worker must win a claim before moving a file to a target. Claims are never
//! removed once placed, so any later worker composing the same target sees it as
//! occupied. `pending` lists input paths that may still be moved away; it is fixed
//! before workers start and read without locking.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Claim {
    /// Source path whose move into this target is still in flight.
    owner: Option<PathBuf>,
    /// Sources left in place under the ignore policy.
    deferred: Vec<PathBuf>,
}

/// Result of trying to claim a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The caller owns the target. `replace` means a pre-existing file will be overwritten.
    Claimed { replace: bool },
    /// Someone else holds the target. `owner` is their source if their move is in flight;
    /// `None` means the bytes are at the target itself.
    Occupied { owner: Option<PathBuf> },
}

#[derive(Debug, Default)]
pub struct ClaimRegistry {
    claims: Mutex<HashMap<PathBuf, Claim>>,
    pending: HashSet<PathBuf>,
}

impl ClaimRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry for a run whose inputs live inside the destination tree.
    pub fn with_pending<I: IntoIterator<Item = PathBuf>>(pending: I) -> Self {
        Self {
            claims: Mutex::default(),
            pending: pending.into_iter().collect(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, Claim>> {
        // Every update is a single map operation, so a poisoned map is still consistent.
        self.claims.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_pending(&self, path: &Path) -> bool {
        self.pending.contains(path)
    }

    /// Claim `target` for `source`. The on-disk check happens before taking the lock;
    /// files only appear at a target after a claim, so the map settles any race.
    pub fn try_claim(&self, target: &Path, source: &Path, replace: bool) -> ClaimOutcome {
        let on_disk = fs::symlink_metadata(target).is_ok();
        let mut claims = self.lock();

        if let Some(claim) = claims.get(target) {
            return ClaimOutcome::Occupied {
                owner: claim.owner.clone(),
            };
        }
        if on_disk && !replace {
            return ClaimOutcome::Occupied { owner: None };
        }
        claims.insert(
            target.to_path_buf(),
            Claim {
                owner: Some(source.to_path_buf()),
                deferred: Vec::new(),
            },
        );
        ClaimOutcome::Claimed { replace: on_disk }
    }

    /// The owner's bytes now live at `target`.
    pub fn mark_placed(&self, target: &Path) {
        if let Some(claim) = self.lock().get_mut(target) {
            claim.owner = None;
        }
    }

    /// Drop a claim whose move failed so the target is decided by what is on disk.
    pub fn release(&self, target: &Path) {
        let mut claims = self.lock();
        match claims.get(target).map(|c| c.deferred.is_empty()) {
            Some(true) => {
                claims.remove(target);
            }
            Some(false) => {
                if let Some(claim) = claims.get_mut(target) {
                    claim.owner = None;
                }
            }
            None => {}
        }
    }

    /// Record a collision left for manual resolution.
    pub fn defer(&self, target: &Path, source: &Path) {
        self.lock()
            .entry(target.to_path_buf())
            .or_default()
            .deferred
            .push(source.to_path_buf());
    }

    /// Targets with deferred sources, sorted by target.
    pub fn unresolved(&self) -> Vec<(PathBuf, Vec<PathBuf>)> {
        let claims = self.lock();
        let mut out: Vec<_> = claims
            .iter()
            .filter(|(_, c)| !c.deferred.is_empty())
            .map(|(t, c)| {
                let mut sources = c.deferred.clone();
                sources.sort();
                (t.clone(), sources)
            })
            .collect();
        out.sort();
        out
    }
}
