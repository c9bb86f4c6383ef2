//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Picks the file from `--config`, then `MEDIA_SORT_CONFIG`, then the platform default.
//!
//! Notes:
//! - This module only reads the config file; directory validation happens in `validate`.
//! - Unknown XML fields and invalid values are hard errors so misconfigurations surface
//!   before any file is touched.
//!
//! Example:
//! ```xml
//! <config>
//!   <destination>/srv/photos</destination>
//!   <source>/srv/inbox</source>
//!   <source>/mnt/camera</source>
//!   <conflict_policy>hash</conflict_policy>
//!   <prune>true</prune>
//! </config>
//! ```

use anyhow::{Context, Result, anyhow, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::CONFIG_ENV;
use super::paths::default_config_path;
use super::types::{Config, ConflictPolicy, LogLevel};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    #[serde(rename = "destination")]
    destination: Option<String>,
    #[serde(rename = "source", default)]
    sources: Vec<String>,
    #[serde(rename = "pattern")]
    pattern: Option<String>,
    #[serde(rename = "conflict_policy")]
    conflict_policy: Option<String>,
    #[serde(rename = "replace")]
    replace: Option<bool>,
    #[serde(rename = "prune")]
    prune: Option<bool>,
    #[serde(rename = "dry_run")]
    dry_run: Option<bool>,
    #[serde(rename = "time_separator")]
    time_separator: Option<String>,
    /// Worker count; blank or non-numeric values fall back to the default
    #[serde(rename = "jobs", default, deserialize_with = "de_usize_trimmed_opt")]
    jobs: Option<usize>,
    #[serde(rename = "log_level")]
    log_level: Option<String>,
    #[serde(rename = "log_file")]
    log_file: Option<String>,
}

// Custom deserializer that trims surrounding whitespace for optional usize
fn de_usize_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| s.trim().parse::<usize>().ok()))
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

// Map XmlConfig -> Config on top of defaults.
fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(d) = non_empty(parsed.destination.as_deref()) {
        cfg.destination = PathBuf::from(d);
    }
    cfg.sources = parsed
        .sources
        .iter()
        .filter_map(|s| non_empty(Some(s.as_str())))
        .map(PathBuf::from)
        .collect();
    if let Some(p) = non_empty(parsed.pattern.as_deref()) {
        cfg.pattern = p.to_string();
    }
    if let Some(p) = non_empty(parsed.conflict_policy.as_deref()) {
        cfg.conflict_policy = p.parse::<ConflictPolicy>().map_err(|e| anyhow!(e))?;
    }
    if let Some(sep) = non_empty(parsed.time_separator.as_deref()) {
        let mut chars = sep.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => cfg.time_separator = Some(c),
            _ => bail!("time_separator must be a single character, got '{sep}'"),
        }
    }
    if let Some(s) = non_empty(parsed.log_level.as_deref()) {
        cfg.log_level = s.parse::<LogLevel>().map_err(|e| anyhow!(e))?;
    }
    cfg.log_file = non_empty(parsed.log_file.as_deref()).map(PathBuf::from);

    cfg.replace = parsed.replace.unwrap_or(false);
    cfg.prune = parsed.prune.unwrap_or(false);
    cfg.dry_run = parsed.dry_run.unwrap_or(false);
    cfg.jobs = parsed.jobs;

    Ok(cfg)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    xml_to_config(parsed).with_context(|| format!("invalid value in '{}'", path.display()))
}

/// Decide which config file to read.
///
/// Precedence: `explicit` (from `--config`) > `MEDIA_SORT_CONFIG` > platform default.
/// An explicitly named file must exist; a missing default file simply means "no config".
pub fn locate_config(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(p) = explicit {
        if !p.is_file() {
            bail!("config file '{}' does not exist", p.display());
        }
        return Ok(Some(p.to_path_buf()));
    }
    if let Some(p) = env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        let p = PathBuf::from(p);
        if !p.is_file() {
            bail!("{CONFIG_ENV} points to '{}', which does not exist", p.display());
        }
        return Ok(Some(p));
    }
    match default_config_path() {
        Some(p) if p.is_file() => Ok(Some(p)),
        Some(p) => {
            debug!(path = %p.display(), "no config file at default location");
            Ok(None)
        }
        None => Ok(None),
    }
}
