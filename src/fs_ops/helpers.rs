//! I/O error helpers.
//!
//! Enrich io::Error with the operation, the path, and a platform-aware hint so a
//! failed rename or delete in a worker log says what to check.
//!
//! Usage:
//!   // worker code returning Result<_, SortError>
//!   fs::remove_file(p).map_err(fs_error("remove duplicate", p))?;
//!
//!   // startup code returning anyhow::Result<_>
//!   fs::create_dir_all(dir).map_err(io_error_with_help("create dir", dir))?;

use anyhow::anyhow;
use std::io;
use std::path::Path;

use crate::errors::SortError;

fn os_code_hint(code: i32) -> Option<&'static str> {
    #[cfg(unix)]
    {
        match code {
            libc::EACCES | libc::EPERM => Some("permission denied; check ownership and write permissions"),
            libc::EXDEV => Some("cross-filesystem; atomic rename not possible"),
            libc::EBUSY => Some("resource busy; ensure no other process is writing"),
            libc::ENOENT => Some("path not found; it may have been moved by another worker"),
            libc::EEXIST => Some("already exists"),
            libc::ENOSPC => Some("insufficient space on device"),
            libc::EROFS => Some("read-only filesystem; cannot write here"),
            libc::ELOOP => Some("too many symbolic link levels (ELOOP); possible symlink cycle"),
            libc::ENAMETOOLONG => Some("filename or path too long; shorten the pattern"),
            libc::EMFILE => Some("process file descriptor limit reached; lower --jobs or raise limits"),
            libc::ENFILE => Some("system-wide file table overflow; reduce open files"),
            libc::EINVAL => Some("invalid argument; the file name may contain characters this filesystem rejects"),
            _ => None,
        }
    }
    #[cfg(windows)]
    {
        match code {
            5 => Some("access denied; check permissions"),
            17 => Some("not same device; cross-filesystem move"),
            32 => Some("sharing violation; file is in use"),
            2 | 3 => Some("path not found; verify it exists"),
            80 => Some("already exists"),
            112 => Some("insufficient disk space"),
            123 => Some("invalid file name; ':' is not allowed, set time_separator"),
            206 => Some("filename or path too long (MAX_PATH exceeded)"),
            _ => None,
        }
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = code;
        None
    }
}

fn kind_hint(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and write permissions"),
        io::ErrorKind::NotFound => Some("path not found; it may have been moved by another worker"),
        io::ErrorKind::AlreadyExists => Some("already exists"),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Some("busy/timed out; retry later"),
        _ => None,
    }
}

/// Format a human-friendly message with op/path plus platform-aware hints.
fn build_message(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);
    match e.raw_os_error() {
        Some(code) => {
            if let Some(hint) = os_code_hint(code) {
                msg.push_str(" - ");
                msg.push_str(hint);
                msg.push('.');
            }
            msg.push_str(&format!(" [os code: {}]", code));
        }
        None => {
            if let Some(hint) = kind_hint(e.kind()) {
                msg.push_str(" - ");
                msg.push_str(hint);
                msg.push('.');
            }
        }
    }
    msg
}

/// Adapter for anyhow::Result code (startup, config).
pub fn io_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> anyhow::Error + 'a {
    move |e: io::Error| anyhow!(build_message(op, path, &e))
}

/// Adapter for per-file code: wraps the io::Error in `SortError::Filesystem`,
/// keeping the original error as the source so its kind can still be inspected.
pub fn fs_error<'a>(op: &'a str, path: &'a Path) -> impl FnOnce(io::Error) -> SortError + 'a {
    move |e: io::Error| SortError::Filesystem {
        message: build_message(op, path, &e),
        path: path.to_path_buf(),
        source: e,
    }
}
