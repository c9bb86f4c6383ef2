use std::fs;
use tempfile::tempdir;

use media_sort::config::validate_and_normalize;
use media_sort::hash::digest_file;
use media_sort::{Config, ConflictPolicy, NoMetadata, run};

#[test]
fn second_distinct_file_gets_its_own_digest() {
    let td = tempdir().unwrap();
    let inbox = td.path().join("inbox");
    let dest = td.path().join("photos");
    fs::create_dir_all(inbox.join("a")).unwrap();
    fs::create_dir_all(inbox.join("b")).unwrap();
    let first = inbox.join("a/2021-01-01.png");
    let second = inbox.join("b/2021-01-01.png");
    fs::write(&first, b"first picture").unwrap();
    fs::write(&second, b"second picture").unwrap();
    let first_hex = digest_file(&first).unwrap().to_hex();
    let second_hex = digest_file(&second).unwrap().to_hex();

    let mut cfg = Config::new(&dest).with_sources([&inbox]);
    cfg.conflict_policy = ConflictPolicy::Hash;
    cfg.time_separator = Some('-');
    validate_and_normalize(&mut cfg).unwrap();
    let summary = run(&cfg, &NoMetadata).unwrap();
    assert_eq!(summary.renamed, 2);

    let month = cfg.destination.join("2021/01");
    let plain = month.join("2021-01-01_00-00-00.png");
    let winner = fs::read(&plain).unwrap();
    let (loser_hex, loser_bytes) = if winner == b"first picture" {
        (second_hex.as_str(), &b"second picture"[..])
    } else {
        (first_hex.as_str(), &b"first picture"[..])
    };
    let marked = month.join(format!("2021-01-01_00-00-00-{loser_hex}.png"));
    assert_eq!(fs::read(marked).unwrap(), loser_bytes);
}

#[test]
fn third_file_with_same_digest_prefix_is_a_duplicate() {
    let td = tempdir().unwrap();
    let inbox = td.path().join("inbox");
    let dest = td.path().join("photos");
    for (dir, body) in [("a", "x"), ("b", "y"), ("c", "y")] {
        fs::create_dir_all(inbox.join(dir)).unwrap();
        fs::write(inbox.join(dir).join("2021-01-01.png"), body).unwrap();
    }

    let mut cfg = Config::new(&dest).with_sources([&inbox]);
    cfg.conflict_policy = ConflictPolicy::Hash;
    cfg.time_separator = Some('-');
    validate_and_normalize(&mut cfg).unwrap();
    let summary = run(&cfg, &NoMetadata).unwrap();

    assert_eq!(summary.renamed, 2);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(fs::read_dir(cfg.destination.join("2021/01")).unwrap().count(), 2);
}
