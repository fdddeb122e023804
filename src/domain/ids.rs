//! Domain identifier types
//!
//! Moodle identifies every record by a positive integer. These newtypes keep
//! course, user, role, enrolment, quiz and attempt ids from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! remote_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw remote id
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw remote id
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|e| format!("Invalid {} '{}': {}", $label, s, e))
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

remote_id!(
    /// Moodle course id
    ///
    /// ```
    /// use moodlecli::domain::ids::CourseId;
    /// use std::str::FromStr;
    ///
    /// let id = CourseId::from_str("42").unwrap();
    /// assert_eq!(id.get(), 42);
    /// ```
    CourseId,
    "course id"
);
remote_id!(
    /// Moodle user id
    UserId,
    "user id"
);
remote_id!(
    /// Moodle role id
    RoleId,
    "role id"
);
remote_id!(
    /// Id of an enrolment method instance
    EnrolmentId,
    "enrolment id"
);
remote_id!(
    /// Quiz instance id (a grade item's `iteminstance`)
    QuizId,
    "quiz id"
);
remote_id!(
    /// Quiz attempt id
    AttemptId,
    "attempt id"
);
