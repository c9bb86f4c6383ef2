use media_sort::config::types::{ConflictPolicy, LogLevel};
use std::str::FromStr;

#[test]
fn parse_common_levels_case_insensitive() {
    assert_eq!(LogLevel::parse("QUIET"), Some(LogLevel::Quiet));
    assert_eq!(LogLevel::parse("error"), Some(LogLevel::Quiet));
    assert_eq!(LogLevel::parse("Normal"), Some(LogLevel::Normal));
    assert_eq!(LogLevel::parse("verbose"), Some(LogLevel::Info));
    assert_eq!(LogLevel::parse("trace"), Some(LogLevel::Debug));
    assert_eq!(LogLevel::parse("loud"), None);
}

#[test]
fn display_roundtrips_with_fromstr() {
    for lvl in [LogLevel::Quiet, LogLevel::Normal, LogLevel::Info, LogLevel::Debug] {
        assert_eq!(LogLevel::from_str(&lvl.to_string()).unwrap(), lvl);
    }
    for policy in [ConflictPolicy::Counter, ConflictPolicy::Hash, ConflictPolicy::Ignore] {
        assert_eq!(ConflictPolicy::from_str(&policy.to_string()).unwrap(), policy);
    }
}

#[test]
fn conflict_policy_parsing_trims_and_ignores_case() {
    assert_eq!(ConflictPolicy::from_str(" HASH ").unwrap(), ConflictPolicy::Hash);
    assert_eq!(ConflictPolicy::default(), ConflictPolicy::Counter);
    assert!(ConflictPolicy::from_str("").is_err());
}
