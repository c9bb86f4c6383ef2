//! Media classification by extension, plus the metadata collaborator and its EXIF reader.

mod exif_reader;
pub mod metadata;

use std::fmt;
use std::path::Path;

pub use exif_reader::{ExifMetadata, ExifReader};
pub use metadata::{MediaMetadata, MetadataReader, NoMetadata, TIMESTAMP_FORMAT};

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "tiff", "jpg", "jpeg"];
const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "webm", "ogg", "ogv", "mov"];

/// Broad kind of a recognized media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Image,
    Video,
}

impl ContentType {
    /// Classify by extension (case-insensitive). Returns None for anything not sorted.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(ContentType::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(ContentType::Video)
        } else {
            None
        }
    }

    /// Token rendered by the `{type}` placeholder.
    pub fn token(self) -> &'static str {
        match self {
            ContentType::Image => "IMG",
            ContentType::Video => "MOV",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(ContentType::from_path(Path::new("a/B.JPG")), Some(ContentType::Image));
        assert_eq!(ContentType::from_path(Path::new("x.Tiff")), Some(ContentType::Image));
        assert_eq!(ContentType::from_path(Path::new("clip.MOV")), Some(ContentType::Video));
        assert_eq!(ContentType::from_path(Path::new("clip.ogv")), Some(ContentType::Video));
    }

    #[test]
    fn unknown_or_missing_extension_is_none() {
        assert_eq!(ContentType::from_path(Path::new("notes.txt")), None);
        assert_eq!(ContentType::from_path(Path::new("README")), None);
        assert_eq!(ContentType::from_path(Path::new(".jpg")), None);
    }
}
