//! Platform-specific helpers.
//! Hides Unix/Windows differences in file modes and timestamps behind one API.

#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

#[cfg(unix)]
pub use unix::{create_dir_all_shared, open_log_file_secure_append, status_change_time};

#[cfg(not(unix))]
pub use windows::{create_dir_all_shared, open_log_file_secure_append, status_change_time};
