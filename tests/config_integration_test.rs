//! Integration tests for configuration loading and validation
//!
//! Note: load_config reads the process environment, so every test here holds
//! ENV_MUTEX and clears the variables it may observe.

use moodlecli::config::load_config;
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ENV_VARS: &[&str] = &[
    "MOODLE_URL",
    "MOODLE_TOKEN",
    "MOODLECLI_MOODLE_TIMEOUT_SECONDS",
    "MOODLECLI_PROVISIONING_POLL_INTERVAL_SECONDS",
    "MOODLECLI_PROVISIONING_MAX_POLL_ATTEMPTS",
    "MOODLECLI_PROVISIONING_INSTRUCTOR_ROLE",
    "MOODLECLI_PROVISIONING_STUDENT_ROLE",
    "MOODLECLI_STORAGE_ROOT",
    "MOODLECLI_LOGGING_LEVEL",
    "MOODLECLI_LOGGING_LOCAL_ENABLED",
    "MOODLECLI_LOGGING_LOCAL_PATH",
    "MOODLECLI_LOGGING_LOCAL_ROTATION",
    "TEST_MOODLECLI_TOKEN",
];

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    for name in ENV_VARS {
        std::env::remove_var(name);
    }
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(contents.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = config_file(
        r#"
[moodle]
base_url = "https://moodle.example.com"
token = "e4586db9345084f15abc7326b84dde21"
timeout_seconds = 900

[provisioning]
poll_interval_seconds = 15
max_poll_attempts = 40
instructor_role = "teacher"
student_role = "learner"

[storage]
root = "/var/lib/moodlecli"

[logging]
level = "debug"
local_enabled = true
local_path = "/tmp/moodlecli"
local_rotation = "hourly"
"#,
    );

    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.moodle.base_url, "https://moodle.example.com");
    assert_eq!(
        config.moodle.token.expose_secret().as_ref(),
        "e4586db9345084f15abc7326b84dde21"
    );
    assert_eq!(config.moodle.timeout_seconds, 900);

    assert_eq!(config.provisioning.poll_interval_seconds, 15);
    assert_eq!(config.provisioning.max_poll_attempts, Some(40));
    assert_eq!(config.provisioning.instructor_role, "teacher");
    assert_eq!(config.provisioning.student_role, "learner");

    assert_eq!(config.storage.root, "/var/lib/moodlecli");

    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_path, "/tmp/moodlecli");
    assert_eq!(config.logging.local_rotation, "hourly");

    assert!(config.validate_all().is_ok());
}

#[test]
fn test_load_empty_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = config_file("");
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.moodle.timeout_seconds, 600);
    assert_eq!(config.provisioning.poll_interval_seconds, 30);
    assert_eq!(config.provisioning.max_poll_attempts, None);
    assert_eq!(config.storage.root, "storage");
    assert_eq!(config.logging.level, "info");

    // Storage-only commands work without a connection; the rest do not
    assert!(config.validate().is_ok());
    let err = config.validate_all().unwrap_err();
    assert!(err.contains("MOODLE_URL"));
}

#[test]
fn test_connection_from_environment() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("MOODLE_URL", "http://dagobah");
    std::env::set_var("MOODLE_TOKEN", "1234");

    let temp_file = config_file(
        r#"
[moodle]
base_url = "https://ignored.example.com"
"#,
    );
    let result = load_config(temp_file.path());
    cleanup_env_vars();

    let config = result.unwrap();
    assert_eq!(config.moodle.base_url, "http://dagobah");
    assert_eq!(config.moodle.token.expose_secret().as_ref(), "1234");
    assert!(config.moodle.validate().is_ok());
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_MOODLECLI_TOKEN", "substituted-token");

    let temp_file = config_file(
        r#"
[moodle]
base_url = "https://moodle.example.com"
token = "${TEST_MOODLECLI_TOKEN}"
"#,
    );
    let result = load_config(temp_file.path());
    cleanup_env_vars();

    let config = result.unwrap();
    assert_eq!(
        config.moodle.token.expose_secret().as_ref(),
        "substituted-token"
    );
}

#[test]
fn test_missing_substitution_variable() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = config_file(
        r#"
[moodle]
token = "${TEST_MOODLECLI_TOKEN}"
"#,
    );
    let err = load_config(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_MOODLECLI_TOKEN"));
}

#[test]
fn test_env_overrides_file_values() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("MOODLECLI_PROVISIONING_MAX_POLL_ATTEMPTS", "");
    std::env::set_var("MOODLECLI_STORAGE_ROOT", "/srv/exports");
    std::env::set_var("MOODLECLI_LOGGING_LEVEL", "warn");

    let temp_file = config_file(
        r#"
[provisioning]
max_poll_attempts = 10

[storage]
root = "/tmp/exports"
"#,
    );
    let result = load_config(temp_file.path());
    cleanup_env_vars();

    let config = result.unwrap();
    assert_eq!(config.provisioning.max_poll_attempts, None);
    assert_eq!(config.storage.root, "/srv/exports");
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_invalid_values_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let cases = [
        ("[provisioning]\npoll_interval_seconds = 0\n", "poll_interval_seconds"),
        ("[provisioning]\nmax_poll_attempts = 0\n", "max_poll_attempts"),
        ("[logging]\nlevel = \"verbose\"\n", "logging.level"),
        ("[logging]\nlocal_rotation = \"size\"\n", "local_rotation"),
        ("[storage]\nroot = \"\"\n", "storage.root"),
        ("[moodle]\ntimeout_seconds = 0\n", "timeout_seconds"),
    ];

    for (contents, expected) in cases {
        let temp_file = config_file(contents);
        let err = load_config(temp_file.path()).unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "{contents:?} gave {err}"
        );
    }
}

#[test]
fn test_malformed_toml_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = config_file("[moodle\nbase_url = 1");
    let err = load_config(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("Configuration error"));
}

#[test]
fn test_invalid_url_rejected_by_connection_check() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = config_file(
        r#"
[moodle]
base_url = "moodle.example.com"
token = "abc"
"#,
    );
    let config = load_config(temp_file.path()).unwrap();
    let err = config.moodle.validate().unwrap_err();
    assert!(err.contains("http://"));
}
