#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::path::PathBuf;

use super::*;

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_defaults() {
    let config = Config::from_vars(&HashMap::new()).unwrap();
    assert_eq!(config.token, None);
    assert_eq!(config.db_path, None);
    assert_eq!(config.poll_timeout_secs, 30);
    assert_eq!(config.repo_url, None);
    assert_eq!(config.require_token(), Err(ConfigError::MissingToken));
}

#[test]
fn test_all_set() {
    let config = Config::from_vars(&vars(&[
        ("DEBTBOT_TOKEN", "123:abc"),
        ("DEBTBOT_DB", "/tmp/debt.sqlite"),
        ("DEBTBOT_POLL_TIMEOUT", "50"),
        ("DEBTBOT_REPO_URL", "https://example.org/debtbot"),
    ]))
    .unwrap();
    assert_eq!(config.require_token(), Ok("123:abc"));
    assert_eq!(config.database_path(), Ok(PathBuf::from("/tmp/debt.sqlite")));
    assert_eq!(config.poll_timeout_secs, 50);
    assert_eq!(config.repo_url.as_deref(), Some("https://example.org/debtbot"));
}

#[test]
fn test_token_fallback() {
    let config = Config::from_vars(&vars(&[("TELEGRAM_BOT_TOKEN", "456:def")])).unwrap();
    assert_eq!(config.token.as_deref(), Some("456:def"));

    let config = Config::from_vars(&vars(&[
        ("DEBTBOT_TOKEN", "123:abc"),
        ("TELEGRAM_BOT_TOKEN", "456:def"),
    ]))
    .unwrap();
    assert_eq!(config.token.as_deref(), Some("123:abc"));
}

#[test]
fn test_blank_values_are_unset() {
    let config = Config::from_vars(&vars(&[("DEBTBOT_TOKEN", "  "), ("DEBTBOT_DB", "")])).unwrap();
    assert_eq!(config.token, None);
    assert_eq!(config.db_path, None);
}

#[test]
fn test_invalid_poll_timeout() {
    let err = Config::from_vars(&vars(&[("DEBTBOT_POLL_TIMEOUT", "soon")])).unwrap_err();
    assert_eq!(
        err,
        ConfigError::InvalidNumber {
            name: "DEBTBOT_POLL_TIMEOUT",
            value: "soon".into(),
        }
    );
}

#[cfg(unix)]
#[test]
fn test_from_env_ignores_unrelated_non_utf8_entries() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    std::env::set_var("DEBTBOT_TEST_RAW_BYTES", OsStr::from_bytes(b"caf\xe9"));
    let result = Config::from_env();
    std::env::remove_var("DEBTBOT_TEST_RAW_BYTES");
    assert!(result.is_ok());
}
