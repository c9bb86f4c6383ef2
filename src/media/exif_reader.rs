//! EXIF timestamps for still images, read with `kamadak-exif`.
//!
//! JPEG files can also be rewritten: the TIFF block is re-encoded with new `DateTime`
//! and `DateTimeOriginal` fields and spliced back in as the APP1 segment. Other image
//! containers are read only. Videos go through [`NoMetadata`].

use std::fmt::Display;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use exif::experimental::Writer;
use exif::{Exif, Field, In, Tag, Value};

use super::ContentType;
use super::metadata::{MediaMetadata, MetadataReader, NoMetadata};
use crate::errors::SortError;

const EXIF_HEADER: &[u8] = b"Exif\0\0";
const SOI: [u8; 2] = [0xFF, 0xD8];
const APP0: u8 = 0xE0;
const APP1: u8 = 0xE1;
const SOS: u8 = 0xDA;
const EOI: u8 = 0xD9;

fn unreadable(path: &Path, reason: impl Display) -> SortError {
    SortError::UnreadableMetadata {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn parse_exif(bytes: &[u8]) -> Result<Exif, exif::Error> {
    exif::Reader::new().read_from_container(&mut Cursor::new(bytes))
}

fn ascii_field(exif: &Exif, tag: Tag) -> Option<String> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Ascii(parts) => parts
            .first()
            .map(|p| String::from_utf8_lossy(p).trim_end_matches('\0').to_string()),
        _ => None,
    }
}

/// Reads `DateTime` and `DateTimeOriginal` from images; videos carry no metadata.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifReader;

impl MetadataReader for ExifReader {
    fn read(&self, path: &Path) -> Result<Option<Box<dyn MediaMetadata>>, SortError> {
        if ContentType::from_path(path) != Some(ContentType::Image) {
            return NoMetadata.read(path);
        }
        let bytes = fs::read(path).map_err(|e| unreadable(path, e))?;
        let meta = match parse_exif(&bytes) {
            Ok(exif) => ExifMetadata {
                primary: ascii_field(&exif, Tag::DateTime),
                original: ascii_field(&exif, Tag::DateTimeOriginal),
                present: true,
                ..ExifMetadata::empty(path, bytes)
            },
            Err(exif::Error::NotFound(_)) => ExifMetadata::empty(path, bytes),
            Err(e) => return Err(unreadable(path, e)),
        };
        Ok(Some(Box::new(meta)))
    }
}

/// Timestamps of one image, plus the file bytes needed to write them back.
#[derive(Debug)]
pub struct ExifMetadata {
    path: PathBuf,
    bytes: Vec<u8>,
    present: bool,
    primary: Option<String>,
    original: Option<String>,
}

impl ExifMetadata {
    fn empty(path: &Path, bytes: Vec<u8>) -> Self {
        ExifMetadata {
            path: path.to_path_buf(),
            bytes,
            present: false,
            primary: None,
            original: None,
        }
    }
}

impl MediaMetadata for ExifMetadata {
    fn has_metadata(&self) -> bool {
        self.present
    }

    fn primary_timestamp(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    fn original_timestamp(&self) -> Option<&str> {
        self.original.as_deref()
    }

    fn set_timestamps(&mut self, value: &str) {
        self.primary = Some(value.to_string());
        self.original = Some(value.to_string());
    }

    fn can_rewrite(&self) -> bool {
        self.present && self.bytes.starts_with(&SOI)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, SortError> {
        if !self.can_rewrite() {
            return Err(unreadable(&self.path, "only JPEG metadata can be rewritten"));
        }
        let exif = parse_exif(&self.bytes).map_err(|e| unreadable(&self.path, e))?;
        let stamp = |tag, value: &Option<String>| {
            value.as_ref().map(|v| Field {
                tag,
                ifd_num: In::PRIMARY,
                value: Value::Ascii(vec![v.as_bytes().to_vec()]),
            })
        };
        let date_time = stamp(Tag::DateTime, &self.primary);
        let date_time_original = stamp(Tag::DateTimeOriginal, &self.original);

        // Thumbnail IFD and undecodable fields are dropped.
        let mut writer = Writer::new();
        exif.fields()
            .filter(|f| f.ifd_num == In::PRIMARY)
            .filter(|f| f.tag != Tag::DateTime && f.tag != Tag::DateTimeOriginal)
            .filter(|f| !matches!(f.value, Value::Unknown(..)))
            .for_each(|f| writer.push_field(f));
        date_time.iter().chain(&date_time_original).for_each(|f| writer.push_field(f));

        let mut tiff = Cursor::new(Vec::new());
        writer
            .write(&mut tiff, exif.little_endian())
            .map_err(|e| unreadable(&self.path, e))?;
        splice_app1(&self.bytes, &tiff.into_inner()).map_err(|e| unreadable(&self.path, e))
    }
}

fn write_app1(out: &mut Vec<u8>, len: u16, tiff: &[u8]) {
    out.extend_from_slice(&[0xFF, APP1]);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(EXIF_HEADER);
    out.extend_from_slice(tiff);
}

/// Replace the EXIF APP1 segment of `jpeg` with one holding `tiff`. The new segment
/// goes after a leading JFIF APP0, or straight after SOI.
fn splice_app1(jpeg: &[u8], tiff: &[u8]) -> Result<Vec<u8>, String> {
    if !jpeg.starts_with(&SOI) {
        return Err("not a JPEG stream".into());
    }
    let len = u16::try_from(2 + EXIF_HEADER.len() + tiff.len())
        .map_err(|_| "EXIF block does not fit in one APP1 segment".to_string())?;

    let mut out = Vec::with_capacity(jpeg.len() + tiff.len());
    out.extend_from_slice(&SOI);
    let mut pos = SOI.len();
    let mut inserted = false;
    loop {
        let Some(&[0xFF, marker]) = jpeg.get(pos..pos + 2) else {
            return Err(format!("bad segment marker at byte {pos}"));
        };
        if marker == SOS || marker == EOI {
            if !inserted {
                write_app1(&mut out, len, tiff);
            }
            out.extend_from_slice(&jpeg[pos..]);
            return Ok(out);
        }
        let size = jpeg.get(pos + 2..pos + 4).ok_or("truncated segment header")?;
        let size = usize::from(u16::from_be_bytes([size[0], size[1]]));
        if size < 2 {
            return Err(format!("bad segment length at byte {pos}"));
        }
        let end = pos + 2 + size;
        let segment = jpeg.get(pos..end).ok_or("truncated segment")?;
        if !inserted && marker != APP0 {
            write_app1(&mut out, len, tiff);
            inserted = true;
        }
        if !(marker == APP1 && segment[4..].starts_with(EXIF_HEADER)) {
            out.extend_from_slice(segment);
        }
        pos = end;
    }
}
