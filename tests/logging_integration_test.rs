//! Integration tests for logging functionality

use moodlecli::config::LoggingConfig;
use moodlecli::logging::init_logging;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert_eq!(config.level, "info");
    assert!(!config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_invalid_level_is_rejected() {
    let result = init_logging("verbose", &LoggingConfig::default());
    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("verbose"));
    }
}

#[test]
fn test_invalid_rotation_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config = LoggingConfig {
        level: "info".to_string(),
        local_enabled: true,
        local_path: temp_dir.path().join("logs").to_string_lossy().to_string(),
        local_rotation: "size".to_string(),
    };

    assert!(init_logging("info", &config).is_err());
    assert!(!temp_dir.path().join("logs").exists());
}

// The global subscriber can only be installed once per process, so this is
// the only test that initializes logging successfully.
#[test]
fn test_file_logging_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        level: "debug".to_string(),
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };
    assert!(!log_path.exists());

    let guard = init_logging("debug", &config).unwrap();
    tracing::info!("written to the log file");
    drop(guard);

    assert!(log_path.is_dir());
}

#[test]
fn test_logging_macros_usage() {
    // No subscriber is needed for the macros to expand and run
    let error = moodlecli::domain::MoodleCliError::Validation("bad row".to_string());

    moodlecli::log_row_start!(1, 3, "ALG3");
    moodlecli::log_row_failure!(2, "ALG4", &error);
    moodlecli::log_batch_complete!("course bulk setup", 1, 1, Duration::from_secs(10));
    moodlecli::log_retry_attempt!(2, Some(3u32), "Connection timeout");
}
