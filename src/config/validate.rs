//! Config validation logic.
//! Verifies the source roots and destination, canonicalizes them, and checks the
//! pattern and tuning values before any worker starts.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::naming::NameTemplate;

use super::TIME_SEPARATORS;
use super::types::Config;

/// Validate `cfg` and rewrite its paths into canonical absolute form.
///
/// - destination: created when missing (except in dry-run), must be a writable directory
/// - sources: default to the destination; each must be an existing directory
/// - pattern: compiled once so template errors surface at startup
pub fn validate_and_normalize(cfg: &mut Config) -> Result<()> {
    if cfg.destination.as_os_str().is_empty() {
        bail!("no destination given; pass it as the last positional argument or set <destination>");
    }

    cfg.destination = normalize_destination(&cfg.destination, cfg.dry_run)?;

    let mut sources = Vec::new();
    for src in cfg.effective_sources() {
        ensure_dir_exists_and_is_dir(&src, "source")?;
        let real = dunce::canonicalize(&src)
            .with_context(|| format!("Failed to resolve source '{}'", src.display()))?;
        if !sources.contains(&real) {
            sources.push(real);
        }
    }
    cfg.sources = sources;

    if cfg.jobs == Some(0) {
        bail!("jobs must be at least 1");
    }
    if let Some(sep) = cfg.time_separator
        && !TIME_SEPARATORS.contains(&sep)
    {
        bail!("time_separator '{sep}' is not supported; use one of ':', '-', '.'");
    }

    let template = NameTemplate::parse(&cfg.pattern)?;
    if template.sample_file_name(cfg.time_separator).contains(':') {
        warn!(
            pattern = %cfg.pattern,
            "file names will contain ':'; this is invalid on some filesystems, set time_separator to change it"
        );
    }

    info!(
        "Config validated: destination='{}' sources={:?} policy={} dry_run={}",
        cfg.destination.display(),
        cfg.sources,
        cfg.conflict_policy,
        cfg.dry_run
    );
    Ok(())
}

/// True when any source root equals, contains, or lies inside `destination`.
pub fn sources_overlap_destination(sources: &[PathBuf], destination: &Path) -> bool {
    sources
        .iter()
        .any(|s| s == destination || s.starts_with(destination) || destination.starts_with(s))
}

fn normalize_destination(dest: &Path, dry_run: bool) -> Result<PathBuf> {
    if dest.exists() {
        if !dest.is_dir() {
            bail!("destination exists but isn't a directory: {}", dest.display());
        }
    } else if dry_run {
        debug!("dry-run: destination {} does not exist yet", dest.display());
        return std::path::absolute(dest)
            .with_context(|| format!("Failed to resolve destination '{}'", dest.display()));
    } else {
        fs::create_dir_all(dest)
            .with_context(|| format!("Failed to create destination directory '{}'", dest.display()))?;
        info!("Created destination directory: {}", dest.display());
    }

    if !dry_run {
        check_writable(dest).with_context(|| {
            format!("Cannot write to destination '{}'; check permissions", dest.display())
        })?;
    }
    dunce::canonicalize(dest)
        .with_context(|| format!("Failed to resolve destination '{}'", dest.display()))
}

/// Ensure path exists and is a directory; emit clear errors with path context.
fn ensure_dir_exists_and_is_dir(path: &Path, name: &str) -> Result<()> {
    if !path.exists() {
        bail!("{name} does not exist: {}", path.display());
    }
    if !path.is_dir() {
        bail!("{name} is not a directory: {}", path.display());
    }
    Ok(())
}

/// Quick writability check: create and remove a small file in `dir`.
/// Uses create_new to avoid clobbering existing files.
fn check_writable(dir: &Path) -> std::io::Result<()> {
    let scratch = dir.join(format!(".media_sort_write_check_{}.tmp", std::process::id()));
    fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&scratch)?;
    let _ = fs::remove_file(&scratch);
    Ok(())
}
