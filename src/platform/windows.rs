//! Windows implementations of platform helpers.
//! Windows lacks POSIX mode semantics; no ACL management is attempted.

use std::fs::{self, File, Metadata, OpenOptions};
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Open log file for appending.
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path)
}

pub fn create_dir_all_shared(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// File creation time; falls back to modification time where the filesystem lacks it.
pub fn status_change_time(meta: &Metadata) -> SystemTime {
    meta.created()
        .or_else(|_| meta.modified())
        .unwrap_or_else(|_| SystemTime::now())
}
