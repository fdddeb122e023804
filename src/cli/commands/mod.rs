//! CLI command implementations
//!
//! Each command is an `XArgs` struct with an `execute` method returning the
//! process exit code:
//!
//! - `0` success
//! - `1` a bulk row failed (partial output was written)
//! - `2` configuration error, reported before any remote call
//! - `5` fatal error

pub mod course;
pub mod enrol;
pub mod export;
pub mod storage;
pub mod validate;

use crate::adapters::moodle::MoodleClient;
use crate::adapters::storage::LocalBlobStore;
use crate::config::{load_config, MoodleCliConfig};
use crate::core::batch::BatchSummary;
use crate::domain::MoodleCliError;
use serde::Serialize;

/// Exit code for a successful command
pub const EXIT_OK: i32 = 0;
/// Exit code when a bulk row failed
pub const EXIT_PARTIAL: i32 = 1;
/// Exit code for configuration errors
pub const EXIT_CONFIG: i32 = 2;
/// Exit code for fatal errors
pub const EXIT_FATAL: i32 = 5;

/// Loads the configuration file, printing the failure as an exit code
pub(crate) fn load(config_path: &str) -> Result<MoodleCliConfig, i32> {
    load_config(config_path).map_err(|e| {
        tracing::error!(config_path, error = %e, "Failed to load configuration");
        eprintln!("Configuration error: {e}");
        EXIT_CONFIG
    })
}

/// Loads the configuration and builds the Moodle gateway
///
/// A missing site URL or token is a configuration error raised before any
/// remote call.
pub(crate) fn connect(config_path: &str) -> Result<(MoodleCliConfig, MoodleClient), i32> {
    let config = load(config_path)?;

    if let Err(e) = config.moodle.validate() {
        tracing::error!(error = %e, "Moodle connection is not configured");
        eprintln!("Configuration error: {e}");
        eprintln!("Set MOODLE_URL and MOODLE_TOKEN in your environment or configuration file");
        return Err(EXIT_CONFIG);
    }

    match MoodleClient::from_config(&config.moodle) {
        Ok(client) => {
            tracing::debug!(base_url = client.base_url(), "Moodle gateway ready");
            Ok((config, client))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create Moodle client");
            eprintln!("Failed to create Moodle client: {e}");
            Err(EXIT_FATAL)
        }
    }
}

/// Blob store rooted at the configured storage directory
pub(crate) fn blob_store(config: &MoodleCliConfig) -> LocalBlobStore {
    LocalBlobStore::new(&config.storage.root)
}

/// Prints a value as pretty JSON on stdout
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Reports a failed command and maps it to an exit code
pub(crate) fn report_failure(command: &str, error: &MoodleCliError) -> i32 {
    tracing::error!(command, error = %error, "Command failed");
    eprintln!("{command} failed: {error}");
    match error {
        MoodleCliError::Configuration(_) => EXIT_CONFIG,
        _ => EXIT_FATAL,
    }
}

/// Reports a failed bulk command
///
/// Input that could not be read is fatal; anything else means some rows ran
/// and is a partial failure.
pub(crate) fn report_batch_failure(command: &str, error: &MoodleCliError) -> i32 {
    match error {
        MoodleCliError::Csv(_) | MoodleCliError::Io(_) | MoodleCliError::Configuration(_) => {
            report_failure(command, error)
        }
        _ => {
            tracing::error!(command, error = %error, "Bulk command stopped");
            eprintln!("{command} stopped: {error}");
            EXIT_PARTIAL
        }
    }
}

/// Prints a bulk summary and maps it to an exit code
pub(crate) fn print_summary(summary: &BatchSummary) -> i32 {
    println!("Summary ({}):", summary.operation);
    println!("  Started: {}", summary.started_at.to_rfc3339());
    println!("  Rows: {}", summary.total_rows);
    println!("  Succeeded: {}", summary.succeeded);
    println!("  Failed: {}", summary.failed);
    if summary.skipped() > 0 {
        println!("  Skipped: {}", summary.skipped());
    }
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());

    for error in &summary.errors {
        println!("  Row {} ({}): {}", error.row, error.item, error.message);
    }

    if summary.is_successful() {
        EXIT_OK
    } else {
        EXIT_PARTIAL
    }
}
