//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output on stderr (stdout carries command output)
//! - Configurable log levels, overridable with `RUST_LOG`
//! - JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use moodlecli::logging::init_logging;
//! use moodlecli::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! // Use tracing macros for logging
//! tracing::info!("Application started");
//! tracing::error!(error = "Something went wrong", "Error occurred");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of one batch row
///
/// # Example
///
/// ```no_run
/// use moodlecli::log_row_start;
///
/// log_row_start!(1, 20, "alg1");
/// ```
#[macro_export]
macro_rules! log_row_start {
    ($row:expr, $total:expr, $label:expr) => {
        tracing::info!(
            row = $row,
            total = $total,
            item = %$label,
            "Processing row"
        );
    };
}

/// Log the failure of one batch row
///
/// # Example
///
/// ```no_run
/// use moodlecli::log_row_failure;
/// use moodlecli::domain::MoodleCliError;
///
/// let error = MoodleCliError::Validation("bad course id".to_string());
/// log_row_failure!(3, "alg3", &error);
/// ```
#[macro_export]
macro_rules! log_row_failure {
    ($row:expr, $label:expr, $error:expr) => {
        tracing::error!(
            row = $row,
            item = %$label,
            error = %$error,
            "Row failed"
        );
    };
}

/// Log the completion of a batch
///
/// # Example
///
/// ```no_run
/// use moodlecli::log_batch_complete;
/// use std::time::Duration;
///
/// log_batch_complete!("course bulk setup", 10, 1, Duration::from_secs(90));
/// ```
#[macro_export]
macro_rules! log_batch_complete {
    ($operation:expr, $succeeded:expr, $failed:expr, $duration:expr) => {
        tracing::info!(
            operation = $operation,
            succeeded = $succeeded,
            failed = $failed,
            duration_ms = $duration.as_millis() as u64,
            "Batch completed"
        );
    };
}

/// Log a retry attempt
///
/// `max_attempts` is an `Option`; `None` means the retries are unbounded.
///
/// # Example
///
/// ```no_run
/// use moodlecli::log_retry_attempt;
///
/// log_retry_attempt!(2, Some(3u32), "course not listed yet");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = ?$max_attempts,
            reason = $reason,
            "Retrying operation"
        );
    };
}
