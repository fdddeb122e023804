//! Result type alias for moodlecli

use super::errors::MoodleCliError;

/// Result type alias for moodlecli operations
///
/// # Examples
///
/// ```
/// use moodlecli::domain::result::Result;
/// use moodlecli::domain::errors::MoodleCliError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(MoodleCliError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, MoodleCliError>;
