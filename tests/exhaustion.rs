//! Running out of conflict ordinals leaves the source alone and fails the run.

use std::fs;
use tempfile::tempdir;

use media_sort::config::validate_and_normalize;
use media_sort::{Config, NoMetadata, run};

#[test]
fn last_ordinal_taken_by_distinct_content_exhausts() {
    let td = tempdir().unwrap();
    let inbox = td.path().join("inbox");
    let dest = td.path().join("photos");
    fs::create_dir_all(&inbox).unwrap();
    fs::create_dir_all(dest.join("2021/01")).unwrap();
    let source = inbox.join("2021-01-01-999.png");
    let occupant = dest.join("2021/01/2021-01-01_00-00-00-999.png");
    fs::write(&source, b"incoming").unwrap();
    fs::write(&occupant, b"already here").unwrap();

    let mut cfg = Config::new(&dest).with_sources([&inbox]);
    cfg.time_separator = Some('-');
    validate_and_normalize(&mut cfg).unwrap();
    let summary = run(&cfg, &NoMetadata).unwrap();

    assert_eq!(summary.exhausted, 1);
    assert_eq!(summary.deferred, 1);
    assert_eq!(summary.renamed, 0);
    assert!(summary.has_failures());
    assert_eq!(fs::read(&source).unwrap(), b"incoming");
    assert_eq!(fs::read(&occupant).unwrap(), b"already here");
    assert_eq!(fs::read_dir(dest.join("2021/01")).unwrap().count(), 1);
}
