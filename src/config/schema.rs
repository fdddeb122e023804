//! Configuration schema types
//!
//! This module defines the configuration structure for moodlecli. Every
//! section is optional in the TOML file; the Moodle URL and token usually
//! come from `MOODLE_URL` / `MOODLE_TOKEN`.

use crate::config::{secret_string, SecretString};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// Main moodlecli configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoodleCliConfig {
    /// Moodle web-service connection
    #[serde(default)]
    pub moodle: MoodleConfig,

    /// Course provisioning settings
    #[serde(default)]
    pub provisioning: ProvisioningConfig,

    /// Blob storage for exports
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MoodleCliConfig {
    /// Validates every section except the Moodle connection
    ///
    /// The connection is checked separately by [`MoodleConfig::validate`]
    /// so that storage-only commands run without credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        if self.moodle.timeout_seconds == 0 {
            return Err("moodle.timeout_seconds must be > 0".to_string());
        }
        self.provisioning.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Validates every section including the Moodle connection
    pub fn validate_all(&self) -> Result<(), String> {
        self.validate()?;
        self.moodle.validate()
    }
}

/// Moodle web-service connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodleConfig {
    /// Site URL, e.g. `https://moodle.example.com`
    #[serde(default)]
    pub base_url: String,

    /// Web-service token
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default = "empty_secret")]
    pub token: SecretString,

    /// Per-call timeout; duplicating a large course can take minutes
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl MoodleConfig {
    /// Checks that the connection settings are present
    ///
    /// # Errors
    ///
    /// Returns an error naming the environment variable to set when the URL
    /// or token is missing.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("moodle.base_url is required (set MOODLE_URL)".to_string());
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!(
                "moodle.base_url must start with http:// or https://, got '{}'",
                self.base_url
            ));
        }
        if let Err(e) = url::Url::parse(&self.base_url) {
            return Err(format!("moodle.base_url '{}' is not a valid URL: {e}", self.base_url));
        }
        if self.token.expose_secret().is_empty() {
            return Err("moodle.token is required (set MOODLE_TOKEN)".to_string());
        }
        if self.timeout_seconds == 0 {
            return Err("moodle.timeout_seconds must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for MoodleConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: empty_secret(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Course provisioning settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningConfig {
    /// Seconds between course listings while recovering a timed-out duplication
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,

    /// Upper bound on recovery polls; unset polls until the course appears
    #[serde(default)]
    pub max_poll_attempts: Option<u32>,

    /// Role short name instructors are enrolled with
    #[serde(default = "default_instructor_role")]
    pub instructor_role: String,

    /// Role short name of the self enrolment method students use
    #[serde(default = "default_student_role")]
    pub student_role: String,
}

impl ProvisioningConfig {
    fn validate(&self) -> Result<(), String> {
        if self.poll_interval_seconds == 0 {
            return Err("provisioning.poll_interval_seconds must be > 0".to_string());
        }
        if self.max_poll_attempts == Some(0) {
            return Err("provisioning.max_poll_attempts must be > 0 when set".to_string());
        }
        if self.instructor_role.trim().is_empty() || self.student_role.trim().is_empty() {
            return Err("provisioning role short names cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval_seconds(),
            max_poll_attempts: None,
            instructor_role: default_instructor_role(),
            student_role: default_student_role(),
        }
    }
}

/// Blob storage for exports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory; each container is a subdirectory
    #[serde(default = "default_storage_root")]
    pub root: String,
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        if self.root.trim().is_empty() {
            return Err("storage.root cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid logging.level '{}'. Must be one of: {}",
                self.level,
                valid_levels.join(", ")
            ));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn empty_secret() -> SecretString {
    secret_string(String::new())
}

fn default_timeout_seconds() -> u64 {
    600
}

fn default_poll_interval_seconds() -> u64 {
    30
}

fn default_instructor_role() -> String {
    "editingteacher".to_string()
}

fn default_student_role() -> String {
    "student".to_string()
}

fn default_storage_root() -> String {
    "storage".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected() -> MoodleConfig {
        MoodleConfig {
            base_url: "https://moodle.example.com".to_string(),
            token: secret_string("abc".to_string()),
            timeout_seconds: 600,
        }
    }

    #[test]
    fn test_defaults() {
        let config = MoodleCliConfig::default();
        assert_eq!(config.moodle.timeout_seconds, 600);
        assert_eq!(config.provisioning.poll_interval_seconds, 30);
        assert_eq!(config.provisioning.max_poll_attempts, None);
        assert_eq!(config.provisioning.instructor_role, "editingteacher");
        assert_eq!(config.provisioning.student_role, "student");
        assert_eq!(config.storage.root, "storage");
        assert!(!config.logging.local_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: MoodleCliConfig = toml::from_str("").unwrap();
        assert_eq!(config.moodle.timeout_seconds, 600);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_moodle_validation() {
        assert!(connected().validate().is_ok());

        let mut config = connected();
        config.base_url = String::new();
        assert!(config.validate().unwrap_err().contains("MOODLE_URL"));

        let mut config = connected();
        config.base_url = "moodle.example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = connected();
        config.token = secret_string(String::new());
        assert!(config.validate().unwrap_err().contains("MOODLE_TOKEN"));
    }

    #[test]
    fn test_validate_skips_connection() {
        let config = MoodleCliConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn test_provisioning_validation() {
        let mut config = MoodleCliConfig::default();
        config.provisioning.poll_interval_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = MoodleCliConfig::default();
        config.provisioning.max_poll_attempts = Some(0);
        assert!(config.validate().is_err());

        config.provisioning.max_poll_attempts = Some(20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_logging_validation() {
        let mut config = MoodleCliConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = MoodleCliConfig::default();
        config.logging.local_rotation = "size".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_redacted_in_debug() {
        let debug = format!("{:?}", connected());
        assert!(!debug.contains("abc"));
    }
}
