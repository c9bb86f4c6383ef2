//! Composes the candidate target path for a record at a given conflict ordinal.

use std::path::{Path, PathBuf};

use crate::config::{Config, ConflictPolicy};
use crate::errors::SortError;
use crate::record::FileRecord;

use super::template::{NameTemplate, RenderContext};

#[derive(Debug, Clone)]
pub struct NameComposer {
    destination: PathBuf,
    template: NameTemplate,
    policy: ConflictPolicy,
    time_separator: Option<char>,
}

impl NameComposer {
    pub fn new(
        destination: impl Into<PathBuf>,
        template: NameTemplate,
        policy: ConflictPolicy,
        time_separator: Option<char>,
    ) -> Self {
        Self {
            destination: destination.into(),
            template,
            policy,
            time_separator,
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self, SortError> {
        Ok(Self::new(
            cfg.destination.clone(),
            NameTemplate::parse(&cfg.pattern)?,
            cfg.conflict_policy,
            cfg.time_separator,
        ))
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Path for `record` at `ordinal`. Reads the file only when the template or the
    /// marker needs its digest.
    pub fn compose(&self, record: &FileRecord, ordinal: u32) -> Result<PathBuf, SortError> {
        let hash_marker = self.policy == ConflictPolicy::Hash && ordinal > 0;
        let digest = if hash_marker || self.template.needs_digest() {
            Some(record.digest()?)
        } else {
            None
        };

        let stem = record.stem();
        let rendered = self.template.render(&RenderContext {
            creation: record.creation(),
            prefix: &stem.prefix,
            suffix: &stem.suffix,
            content_type: record.content_type(),
            digest,
            time_separator: self.time_separator,
        });
        let (dir, base) = rendered.rsplit_once('/').unwrap_or(("", rendered.as_str()));

        let mut name = if stem.date_in_stem {
            base.to_string()
        } else {
            format!("{base}_{}", stem.cleaned_stem)
        };
        match (self.policy, digest) {
            (ConflictPolicy::Counter, _) if ordinal > 0 => name.push_str(&format!("-{ordinal}")),
            (ConflictPolicy::Hash, Some(d)) if ordinal == 1 => name.push_str(&format!("-{d}")),
            (ConflictPolicy::Hash, Some(d)) if ordinal > 1 => {
                name.push_str(&format!("-{d}-{}", ordinal - 1))
            }
            _ => {}
        }
        if !record.extension().is_empty() {
            name.push('.');
            name.push_str(record.extension());
        }

        Ok(self
            .destination
            .join(dir.trim_start_matches('/'))
            .join(name))
    }
}
