//! Configuration types: the run settings, console verbosity and the conflict policy.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::DEFAULT_PATTERN;

/// Console verbosity. Each step down shows one more tracing level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Quiet,
    #[default]
    Normal,
    Info,
    Debug,
}

impl LogLevel {
    /// Case-insensitive; accepts a few common synonyms ("error", "verbose", "trace").
    pub fn parse(s: &str) -> Option<Self> {
        let level = match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => LogLevel::Quiet,
            "normal" => LogLevel::Normal,
            "info" | "verbose" => LogLevel::Info,
            "debug" | "trace" => LogLevel::Debug,
            _ => return None,
        };
        Some(level)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown log level '{s}' (expected quiet, normal, info or debug)"))
    }
}

/// What to do when a composed target is occupied by a file with different content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Append `-N` to the base name.
    #[default]
    Counter,
    /// Append `-<digest>` and then `-<digest>-N`.
    Hash,
    /// Leave the file where it is and report the collision.
    Ignore,
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConflictPolicy::Counter => "counter",
            ConflictPolicy::Hash => "hash",
            ConflictPolicy::Ignore => "ignore",
        })
    }
}

impl FromStr for ConflictPolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "counter" => Ok(ConflictPolicy::Counter),
            "hash" => Ok(ConflictPolicy::Hash),
            "ignore" => Ok(ConflictPolicy::Ignore),
            other => Err(format!(
                "invalid conflict policy: '{other}' (expected counter, hash or ignore)"
            )),
        }
    }
}

/// Runtime configuration used by the sorter.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the dated tree
    pub destination: PathBuf,
    /// Roots to collect files from; empty means "the destination itself"
    pub sources: Vec<PathBuf>,
    /// Target template, e.g. `{creation:%Y}/{creation:%m}/...`
    pub pattern: String,
    /// How distinct colliding files are disambiguated
    pub conflict_policy: ConflictPolicy,
    /// Overwrite pre-existing files at a target that no worker claimed
    pub replace: bool,
    /// Delete files whose extension is not a recognized media type
    pub prune: bool,
    /// If true, log decisions but do not modify the filesystem
    pub dry_run: bool,
    /// Replacement for ':' inside rendered `{creation}` values
    pub time_separator: Option<char>,
    /// Worker count; None uses the available parallelism
    pub jobs: Option<usize>,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            destination: PathBuf::new(),
            sources: Vec::new(),
            pattern: DEFAULT_PATTERN.to_string(),
            conflict_policy: ConflictPolicy::Counter,
            replace: false,
            prune: false,
            dry_run: false,
            time_separator: None,
            jobs: None,
            log_level: LogLevel::Normal,
            log_file: None,
        }
    }
}

impl Config {
    /// Construct a Config sorting `destination` in place; other fields use defaults.
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            ..Default::default()
        }
    }

    /// Builder-style helper to add source roots.
    pub fn with_sources<I, P>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.sources.extend(sources.into_iter().map(Into::into));
        self
    }

    /// Source roots actually scanned: the configured ones, or the destination when none are given.
    pub fn effective_sources(&self) -> Vec<PathBuf> {
        if self.sources.is_empty() {
            vec![self.destination.clone()]
        } else {
            self.sources.clone()
        }
    }

    /// Number of worker threads for the run.
    pub fn worker_count(&self) -> usize {
        self.jobs.filter(|n| *n > 0).unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}
