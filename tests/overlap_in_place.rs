//! Sorting a destination in place: inputs already at their names stay put and still
//! count as occupants for everyone else.

use std::fs;
use tempfile::tempdir;

use media_sort::config::validate_and_normalize;
use media_sort::{Config, NoMetadata, run};

#[test]
fn in_place_sort_keeps_sorted_files_and_moves_the_rest() {
    let td = tempdir().unwrap();
    let dest = td.path().join("photos");
    let sorted = dest.join("2020/05/2020-05-01_00-00-00.png");
    fs::create_dir_all(sorted.parent().unwrap()).unwrap();
    fs::write(&sorted, b"A").unwrap();
    fs::create_dir_all(dest.join("holiday")).unwrap();
    fs::write(dest.join("holiday/2020-05-01.png"), b"B").unwrap();
    fs::create_dir_all(dest.join("dup")).unwrap();
    fs::write(dest.join("dup/2020-05-01.png"), b"A").unwrap();

    let mut cfg = Config::new(&dest);
    cfg.time_separator = Some('-');
    validate_and_normalize(&mut cfg).unwrap();
    let summary = run(&cfg, &NoMetadata).unwrap();

    assert_eq!(summary.in_place, 1);
    assert_eq!(summary.renamed, 1);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(fs::read(&sorted).unwrap(), b"A");
    assert_eq!(
        fs::read(dest.join("2020/05/2020-05-01_00-00-00-1.png")).unwrap(),
        b"B"
    );
    assert!(!dest.join("holiday/2020-05-01.png").exists());
    assert!(!dest.join("dup/2020-05-01.png").exists());
}
