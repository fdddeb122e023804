//! Domain models and types for moodlecli.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`CourseId`], [`UserId`], [`RoleId`], ...)
//! - **Domain models** ([`CourseRecord`], [`UserIdentity`], [`GradeTree`], ...)
//! - **Error types** ([`MoodleCliError`], [`MoodleError`], [`StorageError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, MoodleCliError>`]:
//!
//! ```rust
//! use moodlecli::domain::{MoodleCliError, Result};
//! use moodlecli::domain::ids::CourseId;
//! use std::str::FromStr;
//!
//! fn parse(raw: &str) -> Result<CourseId> {
//!     CourseId::from_str(raw).map_err(MoodleCliError::Validation)
//! }
//! # assert!(parse("12").is_ok());
//! ```

pub mod course;
pub mod errors;
pub mod grades;
pub mod ids;
pub mod result;
pub mod user;

// Re-export commonly used types for convenience
pub use course::{Course, CourseRecord, EnrolmentMethod};
pub use errors::{MoodleCliError, MoodleError, ProvisioningStage, StorageError};
pub use grades::{AttemptSummary, GradeItem, GradeTree, QuizAttempts, UserGrade};
pub use ids::{AttemptId, CourseId, EnrolmentId, QuizId, RoleId, UserId};
pub use result::Result;
pub use user::{AuthMethod, MoodleUser, Role, UserIdentity};
