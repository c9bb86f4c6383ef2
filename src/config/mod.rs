//! Config module.
//! Provides configuration types, the default config location, XML loading, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, path_has_symlink_ancestor};
pub use types::{Config, ConflictPolicy, LogLevel};
pub use validate::{sources_overlap_destination, validate_and_normalize};
pub use xml::{load_config_from_xml_path, locate_config};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "MEDIA_SORT_CONFIG";

/// Template used when neither the CLI nor the config file sets one.
pub const DEFAULT_PATTERN: &str = "{creation:%Y}/{creation:%m}/{creation:%Y-%m-%d_%H:%M:%S}{suffix}";

/// Characters accepted as `time_separator`; all of them are re-read by the filename grammar.
pub const TIME_SEPARATORS: [char; 3] = [':', '-', '.'];
