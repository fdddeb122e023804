//! Export commands
//!
//! Exports are written as JSON blobs to the local blob store rooted at
//! `storage.root`.

use super::{blob_store, connect, print_summary, report_batch_failure, report_failure, EXIT_OK};
use crate::core::batch::{export_bulk, ExportKind};
use crate::core::exports::{export_course_users, export_policy_acceptances, export_user_uuids};
use crate::core::grades::export_grades;
use crate::domain::ids::CourseId;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the export-grades command
#[derive(Args, Debug)]
pub struct ExportGradesArgs {
    /// Course to export
    pub course_id: CourseId,

    /// Container to write to
    pub container: String,

    /// Key of the grade tree; an existing tree there is synchronized incrementally
    pub key: String,
}

impl ExportGradesArgs {
    /// Execute the export-grades command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (config, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let store = blob_store(&config);

        match export_grades(&client, &store, self.course_id, &self.container, &self.key).await {
            Ok(tree) => {
                println!(
                    "Exported grades of {} users to {}/{}",
                    tree.usergrades.len(),
                    self.container,
                    self.key
                );
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("export-grades", &e)),
        }
    }
}

/// Arguments for the export-course-users command
#[derive(Args, Debug)]
pub struct ExportCourseUsersArgs {
    /// Course to export
    pub course_id: CourseId,

    /// Container to write to
    pub container: String,

    /// Key to write to
    pub key: String,
}

impl ExportCourseUsersArgs {
    /// Execute the export-course-users command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (config, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let store = blob_store(&config);

        match export_course_users(&client, &store, self.course_id, &self.container, &self.key).await
        {
            Ok(users) => {
                println!(
                    "Exported {} users to {}/{}",
                    users.users.len(),
                    self.container,
                    self.key
                );
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("export-course-users", &e)),
        }
    }
}

/// Arguments for the site-wide export commands
#[derive(Args, Debug)]
pub struct SiteExportArgs {
    /// Container to write to
    pub container: String,

    /// Key to write to
    pub key: String,
}

impl SiteExportArgs {
    /// Execute the export-user-uuids command
    pub async fn export_user_uuids(&self, config_path: &str) -> anyhow::Result<i32> {
        let (config, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let store = blob_store(&config);

        match export_user_uuids(&client, &store, &self.container, &self.key).await {
            Ok(count) => {
                println!("Exported {count} user UUIDs to {}/{}", self.container, self.key);
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("export-user-uuids", &e)),
        }
    }

    /// Execute the export-policy-acceptances command
    pub async fn export_policy_acceptances(&self, config_path: &str) -> anyhow::Result<i32> {
        let (config, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let store = blob_store(&config);

        match export_policy_acceptances(&client, &store, &self.container, &self.key).await {
            Ok(count) => {
                println!(
                    "Exported {count} policy acceptances to {}/{}",
                    self.container, self.key
                );
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("export-policy-acceptances", &e)),
        }
    }
}

/// Arguments for the export-bulk command
#[derive(Args, Debug)]
pub struct ExportBulkArgs {
    /// CSV listing the course ids to export
    pub input: PathBuf,

    /// Container to write to
    pub container: String,

    /// Key prefix; each course goes to `<prefix>/<course_id>.json`
    pub prefix: String,

    /// What to export: `grades` or `users`
    pub kind: ExportKind,
}

impl ExportBulkArgs {
    /// Execute the export-bulk command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (config, client) = match connect(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let store = blob_store(&config);

        match export_bulk(
            &client,
            &store,
            &self.input,
            &self.container,
            &self.prefix,
            self.kind,
        )
        .await
        {
            Ok(summary) => Ok(print_summary(&summary)),
            Err(e) => Ok(report_batch_failure("export-bulk", &e)),
        }
    }
}
