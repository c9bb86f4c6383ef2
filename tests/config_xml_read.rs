//! Verify XML config is parsed and used without touching user state.

use std::fs;
use tempfile::tempdir;

use media_sort::{ConflictPolicy, LogLevel, load_config_from_xml_path};

#[test]
fn reads_config_xml_and_applies_values() {
    let td = tempdir().expect("create tempdir");
    let cfg_path = td.path().join("config.xml");
    let dest = td.path().join("photos");
    let inbox = td.path().join("inbox");
    let log_file = td.path().join("media_sort.log");

    let xml = format!(
        r#"
<config>
  <destination>{}</destination>
  <source>{}</source>
  <pattern>{{type}}/{{creation:%Y}}/{{creation:%Y%m%d}}{{suffix}}</pattern>
  <conflict_policy>hash</conflict_policy>
  <replace>true</replace>
  <prune>true</prune>
  <dry_run>false</dry_run>
  <time_separator>.</time_separator>
  <jobs>2</jobs>
  <log_level>debug</log_level>
  <log_file>{}</log_file>
</config>
"#,
        dest.display(),
        inbox.display(),
        log_file.display()
    );
    fs::write(&cfg_path, xml).expect("write config.xml");

    let cfg = load_config_from_xml_path(&cfg_path).expect("load_config_from_xml_path");

    assert_eq!(cfg.destination, dest);
    assert_eq!(cfg.sources, vec![inbox]);
    assert_eq!(cfg.pattern, "{type}/{creation:%Y}/{creation:%Y%m%d}{suffix}");
    assert_eq!(cfg.conflict_policy, ConflictPolicy::Hash);
    assert!(cfg.replace);
    assert!(cfg.prune);
    assert!(!cfg.dry_run);
    assert_eq!(cfg.time_separator, Some('.'));
    assert_eq!(cfg.jobs, Some(2));
    assert_eq!(cfg.log_level, LogLevel::Debug);
    assert_eq!(cfg.log_file.as_deref(), Some(log_file.as_path()));
}

#[test]
fn missing_elements_keep_defaults() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    fs::write(&cfg_path, "<config><destination>/srv/photos</destination></config>").unwrap();

    let cfg = load_config_from_xml_path(&cfg_path).unwrap();
    assert!(cfg.sources.is_empty());
    assert_eq!(cfg.pattern, media_sort::config::DEFAULT_PATTERN);
    assert_eq!(cfg.conflict_policy, ConflictPolicy::Counter);
    assert_eq!(cfg.time_separator, None);
    assert_eq!(cfg.jobs, None);
    assert_eq!(cfg.log_file, None);
}

#[test]
fn malformed_xml_names_the_file() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("broken.xml");
    fs::write(&cfg_path, "<config><destination>/x</config>").unwrap();
    let err = load_config_from_xml_path(&cfg_path).unwrap_err();
    assert!(format!("{err:#}").contains("broken.xml"));
}
