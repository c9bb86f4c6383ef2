//! Core library for `media_sort`.
//!
//! Sorts images and videos into a dated directory tree. Identical files are removed and
//! distinct files that compose to the same name get a conflict marker. Workers run in
//! parallel and coordinate through a [`ClaimRegistry`].
//!
//! Typical use:
//! ```no_run
//! use media_sort::{Config, ExifReader, config::validate_and_normalize, pipeline};
//!
//! let mut cfg = Config::new("/srv/photos").with_sources(["/srv/inbox"]);
//! validate_and_normalize(&mut cfg)?;
//! let summary = pipeline::run(&cfg, &ExifReader)?;
//! println!("renamed {}", summary.renamed);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod dates;
pub mod errors;
pub mod fs_ops;
pub mod hash;
pub mod media;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod platform;
pub mod process;
pub mod record;
pub mod registry;
pub mod resolver;
pub mod shutdown;

pub use config::types::{Config, ConflictPolicy, LogLevel};
pub use config::{default_config_path, load_config_from_xml_path, path_has_symlink_ancestor};
pub use errors::SortError;
pub use hash::ContentDigest;
pub use media::{ContentType, ExifReader, MediaMetadata, MetadataReader, NoMetadata};
pub use naming::{NameComposer, NameTemplate};
pub use pipeline::{RunSummary, run};
pub use registry::ClaimRegistry;
pub use resolver::{ConflictResolver, MAX_ORDINAL, Resolution};
