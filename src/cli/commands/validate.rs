//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the moodlecli configuration, including the Moodle connection settings.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("Configuration loaded");
                c
            }
            Err(e) => {
                println!("Failed to load configuration");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        match config.validate_all() {
            Ok(()) => {
                println!("Configuration is valid");
                println!();
                println!("Configuration Summary:");
                println!("  Moodle URL: {}", config.moodle.base_url);
                println!("  Moodle Token: [REDACTED]");
                println!("  Request Timeout: {}s", config.moodle.timeout_seconds);
                println!(
                    "  Duplicate Poll Interval: {}s",
                    config.provisioning.poll_interval_seconds
                );
                match config.provisioning.max_poll_attempts {
                    Some(max) => println!("  Max Duplicate Polls: {max}"),
                    None => println!("  Max Duplicate Polls: unbounded"),
                }
                println!("  Instructor Role: {}", config.provisioning.instructor_role);
                println!("  Student Role: {}", config.provisioning.student_role);
                println!("  Storage Root: {}", config.storage.root);
                println!("  Log Level: {}", config.logging.level);
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(2) // Configuration error exit code
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_log_level_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moodlecli.toml");
        std::fs::write(&path, "[logging]\nlevel = \"loud\"\n").unwrap();

        let code = ValidateArgs {}.execute(path.to_str().unwrap()).await.unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_complete_config_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moodlecli.toml");
        std::fs::write(
            &path,
            "[moodle]\nbase_url = \"https://moodle.example.com\"\ntoken = \"abc123\"\n",
        )
        .unwrap();

        let code = ValidateArgs {}.execute(path.to_str().unwrap()).await.unwrap();
        assert_eq!(code, 0);
    }
}
