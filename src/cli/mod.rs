//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for moodlecli using clap.

pub mod commands;

use crate::core::batch::Template;
use clap::{Parser, Subcommand};

/// moodlecli - Moodle course administration tool
#[derive(Parser, Debug)]
#[command(name = "moodlecli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "moodlecli.toml", env = "MOODLECLI_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MOODLECLI_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy a course to a new course
    CopyCourse(commands::course::CopyCourseArgs),

    /// Import the content of one course into another
    ImportCourse(commands::course::ImportCourseArgs),

    /// List every course
    Courses(commands::course::CoursesArgs),

    /// Show the course with a short name
    CourseByShortname(commands::course::CourseByShortnameArgs),

    /// List every enrolment method of a course
    CourseEnrolmentMethods(commands::course::CourseEnrolmentMethodsArgs),

    /// Show a self enrolment instance
    SelfEnrolmentInfo(commands::course::SelfEnrolmentInfoArgs),

    /// List the self enrolment methods of a course for a role
    SelfEnrolmentMethods(commands::course::SelfEnrolmentMethodsArgs),

    /// Enable a self enrolment method
    EnableSelfEnrolmentMethod(commands::course::EnableSelfEnrolmentMethodArgs),

    /// Set the key of a self enrolment method
    SetSelfEnrolmentMethodKey(commands::course::SetSelfEnrolmentMethodKeyArgs),

    /// Show a role by short name
    RoleInfo(commands::enrol::RoleInfoArgs),

    /// Show the user with an email
    UserByEmail(commands::enrol::UserByEmailArgs),

    /// Enrol a user in a course
    EnrolUser(commands::enrol::EnrolmentArgs),

    /// Unenrol a user from a course
    UnenrolUser(commands::enrol::EnrolmentArgs),

    /// List the users enrolled in a course
    EnrolledUsers(commands::enrol::EnrolledUsersArgs),

    /// Write an empty course bulk input CSV
    CourseBulkCsv(commands::course::TemplateArgs),

    /// Provision one course per CSV row by duplicating a base course
    CourseBulkSetup(commands::course::CourseBulkSetupArgs),

    /// Write an empty enrol bulk input CSV
    EnrolBulkCsv(commands::course::TemplateArgs),

    /// Enrol every user in a CSV in a course
    EnrolBulk(commands::enrol::EnrolBulkArgs),

    /// Write an empty import bulk input CSV
    ImportBulkCsv(commands::course::TemplateArgs),

    /// Import one course into every course in a CSV
    ImportBulk(commands::course::ImportBulkArgs),

    /// Write an empty export bulk input CSV
    ExportBulkCsv(commands::course::TemplateArgs),

    /// Export the grades of a course, reusing the previous export
    ExportGrades(commands::export::ExportGradesArgs),

    /// Export the users of a course with their UUIDs
    ExportCourseUsers(commands::export::ExportCourseUsersArgs),

    /// Export grades or users of every course in a CSV
    ExportBulk(commands::export::ExportBulkArgs),

    /// Export the UUID of every user
    ExportUserUuids(commands::export::SiteExportArgs),

    /// Export every policy acceptance record
    ExportPolicyAcceptances(commands::export::SiteExportArgs),

    /// List blob store containers
    Containers(commands::storage::ContainersArgs),

    /// List the keys in a container
    ContainerKeys(commands::storage::ContainerArgs),

    /// Print a stored blob
    ShowBlob(commands::storage::ShowBlobArgs),

    /// Create a container
    CreateContainer(commands::storage::ContainerArgs),

    /// Validate configuration
    ValidateConfig(commands::validate::ValidateArgs),
}

impl Commands {
    /// Execute the command and return the process exit code
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        match self {
            Commands::CopyCourse(args) => args.execute(config_path).await,
            Commands::ImportCourse(args) => args.execute(config_path).await,
            Commands::Courses(args) => args.execute(config_path).await,
            Commands::CourseByShortname(args) => args.execute(config_path).await,
            Commands::CourseEnrolmentMethods(args) => args.execute(config_path).await,
            Commands::SelfEnrolmentInfo(args) => args.execute(config_path).await,
            Commands::SelfEnrolmentMethods(args) => args.execute(config_path).await,
            Commands::EnableSelfEnrolmentMethod(args) => args.execute(config_path).await,
            Commands::SetSelfEnrolmentMethodKey(args) => args.execute(config_path).await,
            Commands::RoleInfo(args) => args.execute(config_path).await,
            Commands::UserByEmail(args) => args.execute(config_path).await,
            Commands::EnrolUser(args) => args.enrol(config_path).await,
            Commands::UnenrolUser(args) => args.unenrol(config_path).await,
            Commands::EnrolledUsers(args) => args.execute(config_path).await,
            Commands::CourseBulkCsv(args) => args.execute(Template::CourseBulk).await,
            Commands::CourseBulkSetup(args) => args.execute(config_path).await,
            Commands::EnrolBulkCsv(args) => args.execute(Template::EnrolBulk).await,
            Commands::EnrolBulk(args) => args.execute(config_path).await,
            Commands::ImportBulkCsv(args) => args.execute(Template::ImportBulk).await,
            Commands::ImportBulk(args) => args.execute(config_path).await,
            Commands::ExportBulkCsv(args) => args.execute(Template::ExportBulk).await,
            Commands::ExportGrades(args) => args.execute(config_path).await,
            Commands::ExportCourseUsers(args) => args.execute(config_path).await,
            Commands::ExportBulk(args) => args.execute(config_path).await,
            Commands::ExportUserUuids(args) => args.export_user_uuids(config_path).await,
            Commands::ExportPolicyAcceptances(args) => {
                args.export_policy_acceptances(config_path).await
            }
            Commands::Containers(args) => args.execute(config_path).await,
            Commands::ContainerKeys(args) => args.list_keys(config_path).await,
            Commands::ShowBlob(args) => args.execute(config_path).await,
            Commands::CreateContainer(args) => args.create(config_path).await,
            Commands::ValidateConfig(args) => args.execute(config_path).await,
        }
    }
}
