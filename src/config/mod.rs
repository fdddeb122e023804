//! Configuration management for moodlecli.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Overview
//!
//! moodlecli reads an optional TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Default values for every setting
//! - Environment overrides (`MOODLE_URL`, `MOODLE_TOKEN`, `MOODLECLI_*`)
//! - Validation before any remote call is made
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use moodlecli::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("moodlecli.toml")?;
//! config.moodle.validate()?;
//!
//! println!("Moodle URL: {}", config.moodle.base_url);
//! println!("Storage root: {}", config.storage.root);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`MoodleConfig`] - Site URL, web-service token, request timeout
//! - [`ProvisioningConfig`] - Duplication recovery polling and role names
//! - [`StorageConfig`] - Blob store root
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [moodle]
//! base_url = "https://moodle.example.com"
//! token = "${MOODLE_TOKEN}"
//! timeout_seconds = 600
//!
//! [provisioning]
//! poll_interval_seconds = 30
//! max_poll_attempts = 120
//! instructor_role = "editingteacher"
//! student_role = "student"
//!
//! [storage]
//! root = "/var/lib/moodlecli"
//!
//! [logging]
//! level = "info"
//! local_enabled = true
//! local_path = "/var/log/moodlecli"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{LoggingConfig, MoodleCliConfig, MoodleConfig, ProvisioningConfig, StorageConfig};
pub use secret::{secret_string, SecretString, SecretValue};
