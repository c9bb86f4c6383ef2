//! Metadata collaborator surface.
//!
//! Decoding EXIF or container atoms is delegated to an implementation of
//! [`MetadataReader`]. The sorter only needs two optional timestamp strings, a way to
//! overwrite them, and the re-serialized file bytes.

use std::path::Path;

use crate::errors::SortError;

/// Format of timestamp fields, both when parsing and when rewriting them.
pub const TIMESTAMP_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Timestamps carried by a single file.
pub trait MediaMetadata: Send {
    /// False when the container was readable but holds no metadata block.
    fn has_metadata(&self) -> bool;

    /// Primary creation timestamp field, raw.
    fn primary_timestamp(&self) -> Option<&str>;

    /// Secondary ("original") timestamp field, raw.
    fn original_timestamp(&self) -> Option<&str>;

    /// Overwrite both timestamp fields with `value`.
    fn set_timestamps(&mut self, value: &str);

    /// False when this container can be read but not written back.
    fn can_rewrite(&self) -> bool {
        true
    }

    /// Serialize the whole file, including the updated metadata.
    fn to_bytes(&self) -> Result<Vec<u8>, SortError>;
}

/// Opens metadata for a file. Shared by all workers.
pub trait MetadataReader: Send + Sync {
    /// `Ok(None)` means the format carries no metadata this reader understands.
    /// `Err(SortError::UnreadableMetadata)` is logged by the caller and treated like `Ok(None)`.
    fn read(&self, path: &Path) -> Result<Option<Box<dyn MediaMetadata>>, SortError>;
}

/// Reader that never finds metadata; dates then come from file names or the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMetadata;

impl MetadataReader for NoMetadata {
    fn read(&self, _path: &Path) -> Result<Option<Box<dyn MediaMetadata>>, SortError> {
        Ok(None)
    }
}
