//! Content digests.
//!
//! Files are streamed through BLAKE3 in fixed-size chunks; the first
//! [`DIGEST_LEN`] bytes of the output are kept. That is short enough to embed in
//! file names (16 hex characters) and is the only ground truth for duplicates.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::errors::SortError;
use crate::fs_ops::fs_error;

/// Digest width in bytes; rendered as twice as many hex characters.
pub const DIGEST_LEN: usize = 8;

const CHUNK_SIZE: usize = 64 * 1024;

/// Truncated BLAKE3 digest of a file's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; DIGEST_LEN]);

impl ContentDigest {
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lower-case hex rendering used in file names.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Digest everything `reader` yields, one chunk at a time.
pub fn digest_reader<R: Read>(mut reader: R) -> io::Result<ContentDigest> {
    let mut hasher = blake3::Hasher::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&hasher.finalize().as_bytes()[..DIGEST_LEN]);
    Ok(ContentDigest(out))
}

/// Digest the file at `path`.
pub fn digest_file(path: &Path) -> Result<ContentDigest, SortError> {
    let file = File::open(path).map_err(fs_error("open for hashing", path))?;
    digest_reader(file).map_err(fs_error("read for hashing", path))
}

/// Digest an in-memory buffer; equal to `digest_file` of a file with these bytes.
pub fn digest_bytes(bytes: &[u8]) -> ContentDigest {
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&blake3::hash(bytes).as_bytes()[..DIGEST_LEN]);
    ContentDigest(out)
}
