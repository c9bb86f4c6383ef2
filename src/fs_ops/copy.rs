//! Cross-device fallback and in-place rewrites.
//! Both stage bytes in a hidden temp file beside the destination and then rename it over,
//! so a reader never observes a half-written media file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use super::atomic::try_atomic_move;
use super::helpers::fs_error;
use super::util::unique_temp_path;
use crate::errors::SortError;

fn parent_of(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}

/// Copy `src` to a temp file in `dest`'s directory, fsync it, then rename over `dest`.
pub(super) fn copy_then_rename(src: &Path, dest: &Path) -> Result<(), SortError> {
    let tmp = unique_temp_path(parent_of(dest));

    if let Err(e) = fs::copy(src, &tmp).and_then(|_| fs::File::open(&tmp)?.sync_all()) {
        let _ = fs::remove_file(&tmp);
        return Err(fs_error("copy to temporary file", &tmp)(e));
    }
    if let Err(e) = try_atomic_move(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(fs_error("rename temporary file into place", dest)(e));
    }
    Ok(())
}

/// Replace the contents of `path` with `bytes` atomically.
pub fn write_replacing(path: &Path, bytes: &[u8]) -> Result<(), SortError> {
    let tmp = unique_temp_path(parent_of(path));

    let written = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp)
        .and_then(|mut f| {
            f.write_all(bytes)?;
            f.sync_all()
        });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(fs_error("write temporary file", &tmp)(e));
    }
    if let Err(e) = try_atomic_move(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(fs_error("replace file contents", path)(e));
    }
    Ok(())
}
