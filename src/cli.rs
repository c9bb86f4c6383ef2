//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - Positional paths: the last one is the destination, any before it are sources.
//! - --debug is a shorthand for --log-level debug.

use clap::{Parser, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, ConflictPolicy, LogLevel};

/// Sort images and videos into a dated tree, removing duplicates.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Sort photos and videos into a dated directory tree"
)]
pub struct Args {
    /// SOURCE... DESTINATION. With one path it is both source and destination.
    #[arg(value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub paths: Vec<PathBuf>,

    /// Dry-run: log actions but do not modify the filesystem.
    #[arg(short = 'n', long, help = "Show what would be done, but do not modify files")]
    pub dry_run: bool,

    /// Delete files that are not recognized images or videos.
    #[arg(long, help = "Remove files with unrecognized extensions")]
    pub prune: bool,

    /// How to separate distinct files that compose to the same name.
    #[arg(long, value_name = "POLICY", help = "Conflict policy: counter, hash or ignore")]
    pub conflict: Option<ConflictPolicy>,

    /// Overwrite files already at a target that this run did not place there.
    #[arg(long, help = "Overwrite pre-existing files at a composed target")]
    pub replace: bool,

    /// Target template, relative to the destination.
    #[arg(long, value_name = "TEMPLATE", help = "Target pattern, e.g. '{creation:%Y}/{creation:%m}/{creation:%d}{suffix}'")]
    pub pattern: Option<String>,

    /// Character that replaces ':' in rendered dates.
    #[arg(long, value_name = "CHAR", help = "Replace ':' in rendered dates with '-' or '.'")]
    pub time_separator: Option<char>,

    /// Worker threads.
    #[arg(short = 'j', long, value_name = "N", help = "Number of worker threads (default: all cores)")]
    pub jobs: Option<usize>,

    /// Explicit config file.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath, help = "Read settings from this XML file")]
    pub config: Option<PathBuf>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Also append logs to this file.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath, help = "Append logs to this file")]
    pub log_file: Option<PathBuf>,

    /// Print which config file would be used, then exit.
    #[arg(long, help = "Print the config file location used by media_sort and exit")]
    pub print_config: bool,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,
}

impl Args {
    /// Destination and sources from the positional paths.
    pub fn split_paths(&self) -> Option<(PathBuf, Vec<PathBuf>)> {
        let (dest, sources) = self.paths.split_last()?;
        Some((dest.clone(), sources.to_vec()))
    }

    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some((dest, sources)) = self.split_paths() {
            cfg.destination = dest;
            cfg.sources = sources;
        }
        if let Some(policy) = self.conflict {
            cfg.conflict_policy = policy;
        }
        if let Some(pattern) = &self.pattern {
            cfg.pattern = pattern.clone();
        }
        if let Some(sep) = self.time_separator {
            cfg.time_separator = Some(sep);
        }
        if let Some(jobs) = self.jobs {
            cfg.jobs = Some(jobs);
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(file) = &self.log_file {
            cfg.log_file = Some(file.clone());
        }
        if self.dry_run {
            cfg.dry_run = true;
        }
        if self.prune {
            cfg.prune = true;
        }
        if self.replace {
            cfg.replace = true;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
