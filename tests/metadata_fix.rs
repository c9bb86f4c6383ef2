//! Files whose metadata timestamp is broken get it rewritten before they are sorted.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use media_sort::config::validate_and_normalize;
use media_sort::{Config, MediaMetadata, MetadataReader, SortError, run};

/// Pretends every file carries the given timestamp fields; rewriting replaces the
/// whole file body with a marker line.
struct FakeMeta {
    primary: Option<String>,
    original: Option<String>,
}

impl MediaMetadata for FakeMeta {
    fn has_metadata(&self) -> bool {
        true
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
    fn to_bytes(&self) -> Result<Vec<u8>, SortError> {
        Ok(format!("FIXED {}", self.primary.as_deref().unwrap_or_default()).into_bytes())
    }
}

enum Entry {
    Fields(Option<&'static str>, Option<&'static str>),
    Unreadable,
}

struct FakeReader(HashMap<&'static str, Entry>);

impl MetadataReader for FakeReader {
    fn read(&self, path: &Path) -> Result<Option<Box<dyn MediaMetadata>>, SortError> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        match self.0.get(name) {
            Some(Entry::Fields(p, o)) => Ok(Some(Box::new(FakeMeta {
                primary: p.map(str::to_string),
                original: o.map(str::to_string),
            }))),
            Some(Entry::Unreadable) => Err(SortError::UnreadableMetadata {
                path: path.to_path_buf(),
                reason: "truncated header".into(),
            }),
            None => Ok(None),
        }
    }
}

fn config(inbox: &Path, dest: &Path) -> Config {
    let mut cfg = Config::new(dest).with_sources([inbox]);
    cfg.time_separator = Some('-');
    validate_and_normalize(&mut cfg).unwrap();
    cfg
}

#[test]
fn broken_timestamp_is_rewritten_from_the_name() {
    let td = tempdir().unwrap();
    let inbox = td.path().join("inbox");
    let dest = td.path().join("photos");
    fs::create_dir_all(&inbox).unwrap();
    fs::write(inbox.join("2020-02-03.jpg"), b"raw").unwrap();
    fs::write(inbox.join("trip.jpg"), b"trip").unwrap();
    fs::write(inbox.join("2018-07-07.jpg"), b"unreadable").unwrap();

    let reader = FakeReader(HashMap::from([
        ("2020-02-03.jpg", Entry::Fields(Some("not a date"), None)),
        ("trip.jpg", Entry::Fields(Some("2019:12:31 23:59:58"), None)),
        ("2018-07-07.jpg", Entry::Unreadable),
    ]));
    let cfg = config(&inbox, &dest);
    let summary = run(&cfg, &reader).unwrap();
    assert_eq!(summary.renamed, 3);
    assert_eq!(summary.failed, 0);

    let d = &cfg.destination;
    assert_eq!(
        fs::read_to_string(d.join("2020/02/2020-02-03_00-00-00.jpg")).unwrap(),
        "FIXED 2020:02:03 00:00:00"
    );
    assert_eq!(fs::read(d.join("2019/12/2019-12-31_23-59-58_trip.jpg")).unwrap(), b"trip");
    assert_eq!(
        fs::read(d.join("2018/07/2018-07-07_00-00-00.jpg")).unwrap(),
        b"unreadable"
    );
}

#[test]
fn copy_sorted_before_the_fix_is_still_a_duplicate() {
    let td = tempdir().unwrap();
    let inbox = td.path().join("inbox");
    let dest = td.path().join("photos");
    let sorted = dest.join("2020/02/2020-02-03_00-00-00.jpg");
    fs::create_dir_all(sorted.parent().unwrap()).unwrap();
    fs::write(&sorted, b"raw").unwrap();
    fs::create_dir_all(&inbox).unwrap();
    fs::write(inbox.join("2020-02-03.jpg"), b"raw").unwrap();

    let reader = FakeReader(HashMap::from([(
        "2020-02-03.jpg",
        Entry::Fields(Some("not a date"), None),
    )]));
    let cfg = config(&inbox, &dest);
    let summary = run(&cfg, &reader).unwrap();

    assert_eq!(summary.duplicates, 1);
    assert!(!inbox.join("2020-02-03.jpg").exists());
    assert_eq!(fs::read(&sorted).unwrap(), b"raw");
}

#[test]
fn dry_run_leaves_broken_metadata_alone() {
    let td = tempdir().unwrap();
    let inbox = td.path().join("inbox");
    let dest = td.path().join("photos");
    fs::create_dir_all(&inbox).unwrap();
    fs::write(inbox.join("2020-02-03.jpg"), b"raw").unwrap();

    let reader = FakeReader(HashMap::from([(
        "2020-02-03.jpg",
        Entry::Fields(Some("not a date"), None),
    )]));
    let mut cfg = Config::new(&dest).with_sources([&inbox]);
    cfg.dry_run = true;
    cfg.time_separator = Some('-');
    validate_and_normalize(&mut cfg).unwrap();
    let summary = run(&cfg, &reader).unwrap();

    assert_eq!(summary.renamed, 1);
    assert_eq!(fs::read(inbox.join("2020-02-03.jpg")).unwrap(), b"raw");
}
