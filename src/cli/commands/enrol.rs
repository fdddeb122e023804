//! User, role and enrolment commands

use super::{connect, print_json, print_summary, report_batch_failure, report_failure, EXIT_OK};
use crate::core::batch::enrol_bulk;
use crate::domain::ids::{CourseId, RoleId, UserId};
use crate::domain::user::normalize_email;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the role-info command
#[derive(Args, Debug)]
pub struct RoleInfoArgs {
    /// Role short name, e.g. `editingteacher`
    pub shortname: String,
}

impl RoleInfoArgs {
    /// Execute the role-info command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        match client.get_role_by_shortname(&self.shortname).await {
            Ok(role) => {
                print_json(&role)?;
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("role-info", &e.into())),
        }
    }
}

/// Arguments for the user-by-email command
#[derive(Args, Debug)]
pub struct UserByEmailArgs {
    /// Email to look up (case-insensitive)
    pub email: String,
}

impl UserByEmailArgs {
    /// Execute the user-by-email command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        match client.get_user_by_email(&normalize_email(&self.email)).await {
            Ok(user) => {
                print_json(&user)?;
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("user-by-email", &e.into())),
        }
    }
}

/// Arguments for the enrol-user and unenrol-user commands
#[derive(Args, Debug)]
pub struct EnrolmentArgs {
    /// Course id
    pub course_id: CourseId,

    /// User id
    pub user_id: UserId,

    /// Role id
    pub role_id: RoleId,
}

impl EnrolmentArgs {
    /// Execute the enrol-user command
    pub async fn enrol(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        match client
            .enrol_user(self.course_id, self.user_id, self.role_id)
            .await
        {
            Ok(()) => {
                println!(
                    "Enrolled user {} in course {} with role {}",
                    self.user_id, self.course_id, self.role_id
                );
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("enrol-user", &e.into())),
        }
    }

    /// Execute the unenrol-user command
    pub async fn unenrol(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        match client
            .unenrol_user(self.course_id, self.user_id, self.role_id)
            .await
        {
            Ok(()) => {
                println!(
                    "Unenrolled user {} from course {} (role {})",
                    self.user_id, self.course_id, self.role_id
                );
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("unenrol-user", &e.into())),
        }
    }
}

/// Arguments for the enrolled-users command
#[derive(Args, Debug)]
pub struct EnrolledUsersArgs {
    /// Course whose users to list
    pub course_id: CourseId,
}

impl EnrolledUsersArgs {
    /// Execute the enrolled-users command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        match client.get_enrolled_users(self.course_id).await {
            Ok(users) => {
                print_json(&users)?;
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("enrolled-users", &e.into())),
        }
    }
}

/// Arguments for the enrol-bulk command
#[derive(Args, Debug)]
pub struct EnrolBulkArgs {
    /// Course to enrol users in
    pub course_id: CourseId,

    /// Short name of the role to enrol with, e.g. `student`
    pub role_shortname: String,

    /// Enrol bulk input CSV
    pub input: PathBuf,
}

impl EnrolBulkArgs {
    /// Execute the enrol-bulk command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        match enrol_bulk(&client, self.course_id, &self.role_shortname, &self.input).await {
            Ok(summary) => Ok(print_summary(&summary)),
            Err(e) => Ok(report_batch_failure("enrol-bulk", &e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Commands};
    use crate::domain::ids::{CourseId, RoleId, UserId};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_enrol_user_args() {
        let cli = Cli::parse_from(["moodlecli", "enrol-user", "3", "11", "5"]);
        let Commands::EnrolUser(args) = cli.command else {
            panic!("expected enrol-user");
        };
        assert_eq!(args.course_id, CourseId::new(3));
        assert_eq!(args.user_id, UserId::new(11));
        assert_eq!(args.role_id, RoleId::new(5));
    }

    #[test]
    fn test_enrol_bulk_args() {
        let cli = Cli::parse_from(["moodlecli", "enrol-bulk", "3", "student", "students.csv"]);
        let Commands::EnrolBulk(args) = cli.command else {
            panic!("expected enrol-bulk");
        };
        assert_eq!(args.role_shortname, "student");
        assert_eq!(args.input, PathBuf::from("students.csv"));
    }
}
