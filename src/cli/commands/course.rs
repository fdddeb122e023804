//! Course commands
//!
//! Single-course operations, self enrolment management, and the course and
//! import bulk commands.

use super::{connect, print_json, print_summary, report_batch_failure, report_failure, EXIT_OK};
use crate::core::batch::rows::write_template;
use crate::core::batch::{course_bulk_setup, import_bulk, Template};
use crate::core::provision::{Provisioner, RecoveryPolicy};
use crate::domain::ids::{CourseId, EnrolmentId, RoleId};
use crate::domain::MoodleCliError;
use clap::Args;
use serde_json::json;
use std::path::PathBuf;

/// Arguments for the copy-course command
#[derive(Args, Debug)]
pub struct CopyCourseArgs {
    /// Course to duplicate
    pub source_id: CourseId,

    /// Full name of the new course
    pub course_name: String,

    /// Short name of the new course
    pub course_shortname: String,

    /// Category id of the new course
    pub course_category_id: i64,

    /// Also copy user enrolments
    #[arg(long)]
    pub copy_users: bool,
}

impl CopyCourseArgs {
    /// Execute the copy-course command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        tracing::info!(
            source_id = %self.source_id,
            shortname = %self.course_shortname,
            "Copying course"
        );
        match client
            .copy_course(
                self.source_id,
                &self.course_name,
                &self.course_shortname,
                self.course_category_id,
                self.copy_users,
            )
            .await
        {
            Ok(course_id) => {
                print_json(&json!({ "id": course_id }))?;
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("copy-course", &e.into())),
        }
    }
}

/// Arguments for the import-course command
#[derive(Args, Debug)]
pub struct ImportCourseArgs {
    /// Course to import content from
    pub source_id: CourseId,

    /// Course to import content into
    pub target_id: CourseId,
}

impl ImportCourseArgs {
    /// Execute the import-course command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        match client.import_course(self.source_id, self.target_id).await {
            Ok(()) => {
                println!("Imported course {} into {}", self.source_id, self.target_id);
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("import-course", &e.into())),
        }
    }
}

/// Arguments for the courses command
#[derive(Args, Debug)]
pub struct CoursesArgs {}

impl CoursesArgs {
    /// Execute the courses command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        match client.get_courses().await {
            Ok(courses) => {
                print_json(&courses)?;
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("courses", &e.into())),
        }
    }
}

/// Arguments for the course-by-shortname command
#[derive(Args, Debug)]
pub struct CourseByShortnameArgs {
    /// Short name to look up
    pub shortname: String,
}

impl CourseByShortnameArgs {
    /// Execute the course-by-shortname command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        match client.get_course_by_shortname(&self.shortname).await {
            Ok(course) => {
                print_json(&course)?;
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("course-by-shortname", &e.into())),
        }
    }
}

/// Arguments for the course-enrolment-methods command
#[derive(Args, Debug)]
pub struct CourseEnrolmentMethodsArgs {
    /// Course whose enrolment methods to list
    pub course_id: CourseId,
}

impl CourseEnrolmentMethodsArgs {
    /// Execute the course-enrolment-methods command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        match client.get_course_enrolment_methods(self.course_id).await {
            Ok(methods) => {
                print_json(&methods)?;
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("course-enrolment-methods", &e.into())),
        }
    }
}

/// Arguments for the self-enrolment-info command
#[derive(Args, Debug)]
pub struct SelfEnrolmentInfoArgs {
    /// Self enrolment instance id
    pub instance_id: EnrolmentId,
}

impl SelfEnrolmentInfoArgs {
    /// Execute the self-enrolment-info command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        match client.get_self_enrolment_info(self.instance_id).await {
            Ok(info) => {
                print_json(&info)?;
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("self-enrolment-info", &e.into())),
        }
    }
}

/// Arguments for the self-enrolment-methods command
#[derive(Args, Debug)]
pub struct SelfEnrolmentMethodsArgs {
    /// Course to inspect
    pub course_id: CourseId,

    /// Role the self enrolment method assigns
    pub role_id: RoleId,
}

impl SelfEnrolmentMethodsArgs {
    /// Execute the self-enrolment-methods command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        match client
            .get_self_enrolment_methods(self.course_id, self.role_id)
            .await
        {
            Ok(methods) => {
                print_json(&methods)?;
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("self-enrolment-methods", &e.into())),
        }
    }
}

/// Arguments for the enable-self-enrolment-method command
#[derive(Args, Debug)]
pub struct EnableSelfEnrolmentMethodArgs {
    /// Enrolment method instance id
    pub enrol_id: EnrolmentId,
}

impl EnableSelfEnrolmentMethodArgs {
    /// Execute the enable-self-enrolment-method command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        match client.enable_self_enrolment_method(self.enrol_id).await {
            Ok(response) => {
                print_json(&response)?;
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("enable-self-enrolment-method", &e.into())),
        }
    }
}

/// Arguments for the set-self-enrolment-method-key command
#[derive(Args, Debug)]
pub struct SetSelfEnrolmentMethodKeyArgs {
    /// Enrolment method instance id
    pub enrol_id: EnrolmentId,

    /// New enrolment key
    pub key: String,
}

impl SetSelfEnrolmentMethodKeyArgs {
    /// Execute the set-self-enrolment-method-key command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        match client
            .set_self_enrolment_method_key(self.enrol_id, &self.key)
            .await
        {
            Ok(response) => {
                print_json(&response)?;
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("set-self-enrolment-method-key", &e.into())),
        }
    }
}

/// Arguments for the `*-bulk-csv` template commands
#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Where to write the template
    pub output: PathBuf,
}

impl TemplateArgs {
    /// Write the header-only input template for `template`
    pub async fn execute(&self, template: Template) -> anyhow::Result<i32> {
        match write_template(&self.output, template) {
            Ok(()) => {
                println!("Template written to {}", self.output.display());
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("template", &e)),
        }
    }
}

/// Arguments for the course-bulk-setup command
#[derive(Args, Debug)]
pub struct CourseBulkSetupArgs {
    /// Course every new course is duplicated from
    pub base_course_id: CourseId,

    /// Course bulk input CSV
    pub input: PathBuf,

    /// Course bulk output CSV
    pub output: PathBuf,
}

impl CourseBulkSetupArgs {
    /// Execute the course-bulk-setup command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (config, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let provisioner = Provisioner::new(&client, RecoveryPolicy::from(&config.provisioning));
        let result = course_bulk_setup(
            &provisioner,
            &config.provisioning,
            self.base_course_id,
            &self.input,
            &self.output,
        )
        .await;

        match result {
            Ok(summary) => Ok(print_summary(&summary)),
            Err(e) => {
                if !matches!(e, MoodleCliError::Csv(_) | MoodleCliError::Io(_)) {
                    println!("Partial results written to {}", self.output.display());
                }
                Ok(report_batch_failure("course-bulk-setup", &e))
            }
        }
    }
}

/// Arguments for the import-bulk command
#[derive(Args, Debug)]
pub struct ImportBulkArgs {
    /// Course to import content from
    pub source_id: CourseId,

    /// CSV listing the target course ids
    pub input: PathBuf,
}

impl ImportBulkArgs {
    /// Execute the import-bulk command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        match import_bulk(&client, self.source_id, &self.input).await {
            Ok(summary) => Ok(print_summary(&summary)),
            Err(e) => Ok(report_batch_failure("import-bulk", &e)),
        }
    }
}
