//! Unit tests for configuration parsing and validation.

use std::collections::HashMap;
use std::time::Duration;

use nr12_checklist_bot::config::Config;
use nr12_checklist_bot::AppError;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_apply_when_env_is_empty() {
    let config = Config::from_lookup(|_| None).expect("config");
    assert_eq!(config.db_path.to_string_lossy(), "db.sqlite3");
    assert_eq!(config.max_photo_bytes, 10 * 1024 * 1024);
    assert_eq!(config.session_timeout, Duration::from_millis(7_200_000));
    assert!(config.bot_token.is_empty());
}

#[test]
fn env_overrides_are_honored() {
    let lookup = lookup_from(&[
        ("DB_PATH", "/tmp/erp.sqlite3"),
        ("MAX_FILE_SIZE", "1048576"),
        ("SESSION_TIMEOUT", "60000"),
    ]);
    let config = Config::from_lookup(lookup).expect("config");
    assert_eq!(config.db_path.to_string_lossy(), "/tmp/erp.sqlite3");
    assert_eq!(config.max_photo_bytes, 1_048_576);
    assert_eq!(config.session_timeout, Duration::from_secs(60));
}

#[test]
fn whitespace_around_numbers_is_tolerated() {
    let lookup = lookup_from(&[("MAX_FILE_SIZE", " 2048 ")]);
    let config = Config::from_lookup(lookup).expect("config");
    assert_eq!(config.max_photo_bytes, 2048);
}

#[test]
fn non_numeric_size_is_rejected() {
    let lookup = lookup_from(&[("MAX_FILE_SIZE", "ten megabytes")]);
    let err = Config::from_lookup(lookup).expect_err("must fail");
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn zero_size_is_rejected() {
    let lookup = lookup_from(&[("MAX_FILE_SIZE", "0")]);
    let err = Config::from_lookup(lookup).expect_err("must fail");
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn zero_timeout_is_rejected() {
    let lookup = lookup_from(&[("SESSION_TIMEOUT", "0")]);
    let err = Config::from_lookup(lookup).expect_err("must fail");
    assert!(matches!(err, AppError::Config(_)));
}
