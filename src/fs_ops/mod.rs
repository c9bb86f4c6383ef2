//! Filesystem effects applied by workers: moves, deletions and in-place rewrites.
//! Every function here is a single effect; deciding whether to perform it is the
//! resolver's job.

mod atomic;
mod copy;
mod helpers;
mod util;

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::errors::SortError;
use crate::platform;

pub use copy::write_replacing;
pub use helpers::{fs_error, io_error_with_help};

/// Create every missing directory above `path` (group-writable on Unix).
pub fn create_parent_dirs(path: &Path) -> Result<(), SortError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            platform::create_dir_all_shared(parent).map_err(fs_error("create directory", parent))
        }
        _ => Ok(()),
    }
}

/// Move `src` to `dst`, creating parent directories. An existing file at `dst` is replaced.
/// Falls back to copy + rename + delete when the two paths live on different filesystems.
pub fn move_file(src: &Path, dst: &Path) -> Result<(), SortError> {
    create_parent_dirs(dst)?;

    match atomic::try_atomic_move(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if util::is_cross_device(&e) => {
            debug!(src = %src.display(), dst = %dst.display(), "cross-device move, copying");
            copy::copy_then_rename(src, dst)?;
            fs::remove_file(src).map_err(fs_error("remove source after copy", src))
        }
        Err(e) => Err(fs_error("move", src)(e)),
    }
}

/// Delete a single file.
pub fn remove_file(path: &Path) -> Result<(), SortError> {
    fs::remove_file(path).map_err(fs_error("remove", path))
}
