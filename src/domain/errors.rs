//! Domain error types
//!
//! This module defines the error hierarchy for moodlecli. Errors never expose
//! third-party HTTP or storage types; they are converted at the adapter edge.

use thiserror::Error;

/// Main moodlecli error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum MoodleCliError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Remote web-service errors
    #[error("Moodle error: {0}")]
    Moodle(#[from] MoodleError),

    /// Blob store errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A course provisioning step failed
    #[error("Provisioning of course '{shortname}' failed while {stage}: {source}")]
    Provisioning {
        /// Target course short name
        shortname: String,
        /// Step that was running when the failure happened
        stage: ProvisioningStage,
        /// Underlying failure
        #[source]
        source: Box<MoodleCliError>,
    },

    /// CSV reading or writing errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl MoodleCliError {
    /// The web-service error at the root of this error, if any
    pub fn moodle_error(&self) -> Option<&MoodleError> {
        match self {
            MoodleCliError::Moodle(e) => Some(e),
            MoodleCliError::Provisioning { source, .. } => source.moodle_error(),
            _ => None,
        }
    }
}

/// Steps of the duplicate-course provisioning workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningStage {
    ResolvingInstructor,
    Duplicating,
    DuplicateTimeoutRecovery,
    EnrollingInstructor,
    LocatingStudentEnrolment,
    EnablingEnrolment,
    SettingKey,
    Done,
}

impl std::fmt::Display for ProvisioningStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProvisioningStage::ResolvingInstructor => "resolving instructor",
            ProvisioningStage::Duplicating => "duplicating course",
            ProvisioningStage::DuplicateTimeoutRecovery => "recovering duplicated course",
            ProvisioningStage::EnrollingInstructor => "enrolling instructor",
            ProvisioningStage::LocatingStudentEnrolment => "locating student self enrolment",
            ProvisioningStage::EnablingEnrolment => "enabling self enrolment",
            ProvisioningStage::SettingKey => "setting enrolment key",
            ProvisioningStage::Done => "done",
        };
        write!(f, "{s}")
    }
}

/// Moodle web-service errors
///
/// Transport failures, remote application exceptions and protocol invariant
/// violations are distinct variants so callers can tell them apart.
#[derive(Debug, Error)]
pub enum MoodleError {
    /// Failed to connect to the Moodle server
    #[error("Failed to connect to Moodle server: {0}")]
    ConnectionFailed(String),

    /// The request did not complete within the configured timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// The server answered with a non-success HTTP status
    #[error("HTTP error: {status} - {body}")]
    HttpStatus { status: u16, body: String },

    /// The web service reported an exception in its JSON response
    #[error("Remote exception {exception} ({errorcode}): {message}")]
    Remote {
        exception: String,
        errorcode: String,
        message: String,
    },

    /// The response violated an expectation of the protocol
    #[error("Protocol invariant violated: {0}")]
    InvariantViolation(String),

    /// The response was not in the expected shape
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// A bounded duplication recovery poll never found the new course
    #[error("Duplicated course '{shortname}' not found after {attempts} polls")]
    DuplicateNotFound { shortname: String, attempts: u32 },
}

impl MoodleError {
    /// Whether the failure happened at the transport level
    ///
    /// HTTP 502 and 504 are included: they are what a proxy answers when it
    /// gives up on a long-running request the server is still processing.
    pub fn is_transport(&self) -> bool {
        match self {
            MoodleError::ConnectionFailed(_) | MoodleError::Timeout(_) => true,
            MoodleError::HttpStatus { status, .. } => matches!(status, 502 | 504),
            _ => false,
        }
    }

    /// Whether this is a remote exception with the given exception class
    pub fn is_remote_exception(&self, name: &str) -> bool {
        matches!(self, MoodleError::Remote { exception, .. } if exception == name)
    }
}

/// Blob store errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Container or key does not exist
    #[error("Not found: {container}/{key}")]
    NotFound { container: String, key: String },

    /// Container or key cannot be mapped to a storage location
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Underlying storage I/O failure
    #[error("Storage I/O failure: {0}")]
    Io(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for MoodleCliError {
    fn from(err: std::io::Error) -> Self {
        MoodleCliError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for MoodleCliError {
    fn from(err: serde_json::Error) -> Self {
        MoodleCliError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for MoodleCliError {
    fn from(err: toml::de::Error) -> Self {
        MoodleCliError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for MoodleCliError {
    fn from(err: csv::Error) -> Self {
        MoodleCliError::Csv(err.to_string())
    }
}
