//! Same-filesystem rename.
//! - On Windows, removes an existing destination first (MoveFile does not overwrite).
//! - On Unix, best-effort fsync of the destination directory after rename.

use std::fs;
use std::io;
use std::path::Path;

use super::util::fsync_dir;

pub(super) fn try_atomic_move(src: &Path, dst: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        if let Err(e) = fs::remove_file(dst)
            && e.kind() != io::ErrorKind::NotFound
        {
            return Err(e);
        }
    }

    fs::rename(src, dst)?;

    if let Some(parent) = dst.parent() {
        // A failed fsync must not turn a completed rename into a failure.
        let _ = fsync_dir(parent);
    }
    Ok(())
}
