//! Per-file conflict resolution.
//!
//! Starting from the ordinal recovered from the file name, compose candidates until one is
//! free, holds identical bytes, or (under the ignore policy) the file is deferred.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::config::ConflictPolicy;
use crate::errors::SortError;
use crate::hash::{ContentDigest, digest_file};
use crate::naming::NameComposer;
use crate::record::FileRecord;
use crate::registry::{ClaimOutcome, ClaimRegistry};

/// Largest ordinal a conflict marker may carry (three counter digits).
pub const MAX_ORDINAL: u32 = 999;

/// How often a candidate whose occupant disappeared mid-check is re-examined.
const VANISHED_RETRIES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Already at its composed name.
    InPlace(PathBuf),
    /// Claimed `target`; `replace` overwrites a pre-existing file there.
    Move { target: PathBuf, replace: bool },
    /// Identical bytes already live (or are about to live) at `of`.
    Duplicate { of: PathBuf },
    /// Distinct content at `target` and the policy is ignore.
    Deferred { target: PathBuf },
    /// Every ordinal up to `MAX_ORDINAL` was taken by distinct content.
    Exhausted { last: PathBuf },
}

enum Occupant {
    Digest(ContentDigest),
    Vanished,
}

pub struct ConflictResolver<'a> {
    composer: &'a NameComposer,
    registry: &'a ClaimRegistry,
    replace: bool,
}

impl<'a> ConflictResolver<'a> {
    pub fn new(composer: &'a NameComposer, registry: &'a ClaimRegistry, replace: bool) -> Self {
        Self {
            composer,
            registry,
            replace,
        }
    }

    pub fn resolve(&self, record: &FileRecord) -> Result<Resolution, SortError> {
        let source = record.source();
        let mut ordinal = record.prior_conflicts();
        let mut vanished = 0;

        loop {
            if ordinal > MAX_ORDINAL {
                let last = self.composer.compose(record, MAX_ORDINAL)?;
                return Ok(Resolution::Exhausted { last });
            }
            let candidate = self.composer.compose(record, ordinal)?;
            if candidate == source {
                return Ok(Resolution::InPlace(candidate));
            }

            let owner = if self.registry.is_pending(&candidate) && candidate.exists() {
                None
            } else {
                match self.registry.try_claim(&candidate, source, self.replace) {
                    ClaimOutcome::Claimed { replace } => {
                        return Ok(Resolution::Move {
                            target: candidate,
                            replace,
                        });
                    }
                    ClaimOutcome::Occupied { owner } => owner,
                }
            };

            let occupant = match occupant_digest(&candidate, owner.as_deref())? {
                Occupant::Digest(d) => d,
                Occupant::Vanished if vanished < VANISHED_RETRIES => {
                    vanished += 1;
                    trace!(target = %candidate.display(), "occupant moved away, re-checking");
                    continue;
                }
                // Still flapping: treat as distinct rather than spin.
                Occupant::Vanished => {
                    vanished = 0;
                    ordinal += 1;
                    continue;
                }
            };
            vanished = 0;

            if record.same_content(occupant)? {
                return Ok(Resolution::Duplicate { of: candidate });
            }
            if self.composer.policy() == ConflictPolicy::Ignore {
                self.registry.defer(&candidate, source);
                return Ok(Resolution::Deferred { target: candidate });
            }
            debug!(
                src = %source.display(),
                taken = %candidate.display(),
                ordinal,
                "distinct file at target, trying next ordinal"
            );
            ordinal += 1;
        }
    }
}

/// Digest of whatever occupies `candidate`. An in-flight owner is hashed at its source,
/// falling back to the candidate once the owner's move has landed.
fn occupant_digest(candidate: &Path, owner: Option<&Path>) -> Result<Occupant, SortError> {
    let paths = owner.into_iter().chain(std::iter::once(candidate));
    for path in paths {
        match digest_file(path) {
            Ok(d) => return Ok(Occupant::Digest(d)),
            Err(e) if e.is_not_found() => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(Occupant::Vanished)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PATTERN;
    use crate::media::ContentType;
    use crate::naming::NameTemplate;
    use crate::record::StemParts;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    fn setup(dest: &Path, policy: ConflictPolicy) -> NameComposer {
        NameComposer::new(dest, NameTemplate::parse(DEFAULT_PATTERN).unwrap(), policy, Some('-'))
    }

    fn record_for(path: &Path) -> FileRecord {
        let stem = path.file_stem().unwrap().to_string_lossy();
        let when = NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        FileRecord::new(path, ContentType::Image, when, StemParts::parse(&stem))
    }

    #[test]
    fn free_target_is_claimed() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.png");
        fs::write(&src, b"1").unwrap();
        let composer = setup(&dir.path().join("out"), ConflictPolicy::Counter);
        let reg = ClaimRegistry::new();

        let res = ConflictResolver::new(&composer, &reg, false)
            .resolve(&record_for(&src))
            .unwrap();
        let expected = dir.path().join("out/2021/01/2021-01-01_00-00-00_a.png");
        assert_eq!(res, Resolution::Move { target: expected, replace: false });
    }

    #[test]
    fn identical_occupant_is_duplicate_distinct_moves_on() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let taken = out.join("2021/01/2021-01-01_00-00-00_a.png");
        fs::create_dir_all(taken.parent().unwrap()).unwrap();
        fs::write(&taken, b"same").unwrap();

        let composer = setup(&out, ConflictPolicy::Counter);
        let reg = ClaimRegistry::new();
        let resolver = ConflictResolver::new(&composer, &reg, false);

        let dup = dir.path().join("a.png");
        fs::write(&dup, b"same").unwrap();
        assert_eq!(
            resolver.resolve(&record_for(&dup)).unwrap(),
            Resolution::Duplicate { of: taken.clone() }
        );

        let other = dir.path().join("in");
        fs::create_dir_all(&other).unwrap();
        let distinct = other.join("a.png");
        fs::write(&distinct, b"different").unwrap();
        match resolver.resolve(&record_for(&distinct)).unwrap() {
            Resolution::Move { target, .. } => {
                assert!(target.ends_with("2021-01-01_00-00-00_a-1.png"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn ignore_policy_defers() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let taken = out.join("2021/01/2021-01-01_00-00-00_a.png");
        fs::create_dir_all(taken.parent().unwrap()).unwrap();
        fs::write(&taken, b"old").unwrap();
        let src = dir.path().join("a.png");
        fs::write(&src, b"new").unwrap();

        let composer = setup(&out, ConflictPolicy::Ignore);
        let reg = ClaimRegistry::new();
        let res = ConflictResolver::new(&composer, &reg, false)
            .resolve(&record_for(&src))
            .unwrap();
        assert_eq!(res, Resolution::Deferred { target: taken.clone() });
        assert_eq!(reg.unresolved(), vec![(taken, vec![src])]);
    }

    #[test]
    fn in_flight_owner_is_hashed_at_its_source() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let composer = setup(&out, ConflictPolicy::Counter);
        let reg = ClaimRegistry::new();
        let resolver = ConflictResolver::new(&composer, &reg, false);

        let first = dir.path().join("a.png");
        fs::write(&first, b"bytes").unwrap();
        let claimed = match resolver.resolve(&record_for(&first)).unwrap() {
            Resolution::Move { target, .. } => target,
            other => panic!("unexpected {other:?}"),
        };

        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        let second = sub.join("a.png");
        fs::write(&second, b"bytes").unwrap();
        assert_eq!(
            resolver.resolve(&record_for(&second)).unwrap(),
            Resolution::Duplicate { of: claimed }
        );
    }

    #[test]
    fn replace_overwrites_unclaimed_file() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let taken = out.join("2021/01/2021-01-01_00-00-00_a.png");
        fs::create_dir_all(taken.parent().unwrap()).unwrap();
        fs::write(&taken, b"old").unwrap();
        let src = dir.path().join("a.png");
        fs::write(&src, b"new").unwrap();

        let composer = setup(&out, ConflictPolicy::Counter);
        let reg = ClaimRegistry::new();
        let res = ConflictResolver::new(&composer, &reg, true)
            .resolve(&record_for(&src))
            .unwrap();
        assert_eq!(res, Resolution::Move { target: taken, replace: true });
    }
}
