//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::MoodleCliConfig;
use crate::config::secret_string;
use crate::domain::errors::MoodleCliError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from an optional TOML file plus the environment
///
/// This function:
/// 1. Reads the TOML file if it exists (a missing file means all defaults)
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into MoodleCliConfig
/// 4. Applies environment variable overrides (`MOODLE_URL`, `MOODLE_TOKEN`
///    and the `MOODLECLI_*` prefix)
/// 5. Validates everything except the Moodle connection
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// - File exists but cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - An override has the wrong type
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use moodlecli::config::loader::load_config;
///
/// let config = load_config("moodlecli.toml").expect("Failed to load config");
/// config.moodle.validate().expect("MOODLE_URL and MOODLE_TOKEN must be set");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<MoodleCliConfig> {
    let path = path.as_ref();

    let mut config = if path.exists() {
        let contents = fs::read_to_string(path).map_err(|e| {
            MoodleCliError::Configuration(format!(
                "Failed to read configuration file {}: {e}",
                path.display()
            ))
        })?;
        parse_config(&contents)?
    } else {
        MoodleCliConfig::default()
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

    config.validate().map_err(|e| {
        MoodleCliError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Parses TOML text after `${VAR}` substitution
pub fn parse_config(contents: &str) -> Result<MoodleCliConfig> {
    let contents = substitute_env_vars(contents)?;
    toml::from_str(&contents)
        .map_err(|e| MoodleCliError::Configuration(format!("Failed to parse TOML: {e}")))
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| MoodleCliError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(MoodleCliError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| MoodleCliError::Configuration(format!("Invalid value for {name}: {e}")))
}

/// Applies environment variable overrides
///
/// `MOODLE_URL` and `MOODLE_TOKEN` set the connection; every other setting
/// follows the pattern `MOODLECLI_<SECTION>_<KEY>`, for example
/// `MOODLECLI_PROVISIONING_MAX_POLL_ATTEMPTS`.
///
/// # Arguments
///
/// * `config` - Mutable reference to the configuration to update
/// * `lookup` - Reads one environment variable
pub fn apply_env_overrides<F>(config: &mut MoodleCliConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    // Moodle connection
    if let Some(val) = lookup("MOODLE_URL") {
        config.moodle.base_url = val;
    }
    if let Some(val) = lookup("MOODLE_TOKEN") {
        config.moodle.token = secret_string(val);
    }
    if let Some(val) = lookup("MOODLECLI_MOODLE_TIMEOUT_SECONDS") {
        config.moodle.timeout_seconds = parse_var("MOODLECLI_MOODLE_TIMEOUT_SECONDS", &val)?;
    }

    // Provisioning overrides
    if let Some(val) = lookup("MOODLECLI_PROVISIONING_POLL_INTERVAL_SECONDS") {
        config.provisioning.poll_interval_seconds =
            parse_var("MOODLECLI_PROVISIONING_POLL_INTERVAL_SECONDS", &val)?;
    }
    if let Some(val) = lookup("MOODLECLI_PROVISIONING_MAX_POLL_ATTEMPTS") {
        config.provisioning.max_poll_attempts = if val.trim().is_empty() {
            None
        } else {
            Some(parse_var("MOODLECLI_PROVISIONING_MAX_POLL_ATTEMPTS", &val)?)
        };
    }
    if let Some(val) = lookup("MOODLECLI_PROVISIONING_INSTRUCTOR_ROLE") {
        config.provisioning.instructor_role = val;
    }
    if let Some(val) = lookup("MOODLECLI_PROVISIONING_STUDENT_ROLE") {
        config.provisioning.student_role = val;
    }

    // Storage overrides
    if let Some(val) = lookup("MOODLECLI_STORAGE_ROOT") {
        config.storage.root = val;
    }

    // Logging overrides
    if let Some(val) = lookup("MOODLECLI_LOGGING_LEVEL") {
        config.logging.level = val;
    }
    if let Some(val) = lookup("MOODLECLI_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_var("MOODLECLI_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = lookup("MOODLECLI_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = lookup("MOODLECLI_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
