//! Bulk command orchestration
//!
//! Rows are processed strictly one after the other. Course bulk setup, enrol
//! bulk and import bulk stop at the first failing row; export bulk records
//! the failure and carries on with the next course.

use super::rows::{
    read_records_from_path, write_records_to_path, CourseIdRecord, EnrolRecord,
};
use super::summary::{BatchSummary, RowError};
use crate::adapters::moodle::MoodleClient;
use crate::adapters::storage::BlobStore;
use crate::config::ProvisioningConfig;
use crate::core::exports::export_course_users;
use crate::core::grades::export_grades;
use crate::core::provision::{CourseRoles, Provisioner};
use crate::core::users::resolve_or_create;
use crate::domain::ids::CourseId;
use crate::domain::{CourseRecord, MoodleCliError, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

/// What `export_bulk` writes for each course
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Incremental grade tree
    Grades,
    /// Enrolled users and their external identities
    Users,
}

impl FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grades" => Ok(ExportKind::Grades),
            "users" => Ok(ExportKind::Users),
            other => Err(format!(
                "Invalid export kind '{other}'. Must be 'grades' or 'users'"
            )),
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportKind::Grades => f.write_str("grades"),
            ExportKind::Users => f.write_str("users"),
        }
    }
}

/// Blob key of one course's export under `prefix`
pub fn export_key(prefix: &str, course_id: CourseId) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        format!("{course_id}.json")
    } else {
        format!("{prefix}/{course_id}.json")
    }
}

/// Provisions one course per row of `input` and writes the results to `output`
///
/// Instructor and student roles are looked up once before the first row.
/// Every successfully provisioned row is written to `output`, whether or not
/// a later row failed, before the failure is returned.
///
/// # Arguments
///
/// * `provisioner` - Provisioner carrying the gateway and recovery policy
/// * `config` - Role names to look up
/// * `base_course` - Course every new course is duplicated from
/// * `input` - Course bulk input CSV
/// * `output` - Course bulk output CSV, replaced
///
/// # Errors
///
/// Returns the input parse error before touching `output`. Otherwise returns
/// the role lookup or row error after `output` has been written.
pub async fn course_bulk_setup(
    provisioner: &Provisioner<'_>,
    config: &ProvisioningConfig,
    base_course: CourseId,
    input: &Path,
    output: &Path,
) -> Result<BatchSummary> {
    let records: Vec<CourseRecord> = read_records_from_path(input, &CourseRecord::INPUT_FIELDS)?;
    let start = Instant::now();
    let mut summary = BatchSummary::new("course bulk setup", records.len());
    let mut provisioned = Vec::with_capacity(records.len());

    tracing::info!(
        base_course_id = %base_course,
        rows = records.len(),
        input = %input.display(),
        "Starting course bulk setup"
    );

    let outcome = provision_rows(
        provisioner,
        config,
        base_course,
        records,
        &mut provisioned,
        &mut summary,
    )
    .await;

    let written = write_records_to_path(output, &CourseRecord::OUTPUT_FIELDS, &provisioned);
    match &written {
        Ok(()) => tracing::info!(
            output = %output.display(),
            rows = provisioned.len(),
            "Course bulk output written"
        ),
        Err(e) => tracing::error!(output = %output.display(), error = %e, "Failed to write course bulk output"),
    }

    let summary = summary.with_duration(start.elapsed());
    summary.log_summary();

    outcome?;
    written?;
    Ok(summary)
}

async fn provision_rows(
    provisioner: &Provisioner<'_>,
    config: &ProvisioningConfig,
    base_course: CourseId,
    records: Vec<CourseRecord>,
    provisioned: &mut Vec<CourseRecord>,
    summary: &mut BatchSummary,
) -> Result<()> {
    let roles = CourseRoles::lookup(provisioner.client(), config).await?;
    let total = records.len();

    for (index, record) in records.into_iter().enumerate() {
        let row = index + 1;
        let shortname = record.course_shortname.clone();
        crate::log_row_start!(row, total, &shortname);

        match provisioner.provision(base_course, record, roles).await {
            Ok(record) => {
                provisioned.push(record);
                summary.record_success();
            }
            Err(e) => {
                crate::log_row_failure!(row, &shortname, &e);
                summary.record_failure(RowError::new(row, shortname, e.to_string()));
                return Err(e);
            }
        }
    }
    Ok(())
}

/// Enrols every user listed in `input` in `course_id` with role `role_shortname`
///
/// Users are resolved by email and created when missing.
///
/// # Errors
///
/// Returns the first failing row's error; later rows are not attempted.
pub async fn enrol_bulk(
    client: &MoodleClient,
    course_id: CourseId,
    role_shortname: &str,
    input: &Path,
) -> Result<BatchSummary> {
    let records: Vec<EnrolRecord> = read_records_from_path(input, &EnrolRecord::FIELDS)?;
    let start = Instant::now();
    let mut summary = BatchSummary::new("enrol bulk", records.len());

    let outcome = async {
        let role = client.get_role_by_shortname(role_shortname).await?;
        tracing::info!(
            course_id = %course_id,
            role = role_shortname,
            role_id = %role.id,
            rows = records.len(),
            "Starting enrol bulk"
        );

        for (index, record) in records.iter().enumerate() {
            let row = index + 1;
            crate::log_row_start!(row, records.len(), &record.user_email);

            let enrolled = async {
                let user_id = resolve_or_create(client, &record.identity()).await?;
                client
                    .enrol_user(course_id, user_id, role.id)
                    .await
                    .map_err(MoodleCliError::from)
            }
            .await;

            if let Err(e) = enrolled {
                crate::log_row_failure!(row, &record.user_email, &e);
                summary.record_failure(RowError::new(row, record.user_email.clone(), e.to_string()));
                return Err(e);
            }
            summary.record_success();
        }
        Ok::<(), MoodleCliError>(())
    }
    .await;

    let summary = summary.with_duration(start.elapsed());
    summary.log_summary();
    outcome?;
    Ok(summary)
}

/// Imports the content of `source` into every course listed in `input`
///
/// # Errors
///
/// Returns the first failing row's error; later rows are not attempted.
pub async fn import_bulk(
    client: &MoodleClient,
    source: CourseId,
    input: &Path,
) -> Result<BatchSummary> {
    let records: Vec<CourseIdRecord> = read_records_from_path(input, &CourseIdRecord::FIELDS)?;
    let start = Instant::now();
    let mut summary = BatchSummary::new("import bulk", records.len());

    tracing::info!(source_course_id = %source, rows = records.len(), "Starting import bulk");

    let mut outcome = Ok(());
    for (index, record) in records.iter().enumerate() {
        let row = index + 1;
        crate::log_row_start!(row, records.len(), record.course_id);

        match client.import_course(source, record.course_id).await {
            Ok(()) => summary.record_success(),
            Err(e) => {
                let e = MoodleCliError::from(e);
                crate::log_row_failure!(row, record.course_id, &e);
                summary.record_failure(RowError::new(row, record.course_id.to_string(), e.to_string()));
                outcome = Err(e);
                break;
            }
        }
    }

    let summary = summary.with_duration(start.elapsed());
    summary.log_summary();
    outcome?;
    Ok(summary)
}

/// Exports every course listed in `input` to `container` under `prefix`
///
/// Each course is written to [`export_key`]`(prefix, course_id)`. A failing
/// course is recorded in the summary and does not stop the others.
///
/// # Errors
///
/// Only an unreadable input file is an error; row failures are reported
/// through [`BatchSummary::errors`].
pub async fn export_bulk(
    client: &MoodleClient,
    store: &dyn BlobStore,
    input: &Path,
    container: &str,
    prefix: &str,
    kind: ExportKind,
) -> Result<BatchSummary> {
    let records: Vec<CourseIdRecord> = read_records_from_path(input, &CourseIdRecord::FIELDS)?;
    let start = Instant::now();
    let mut summary = BatchSummary::new("export bulk", records.len());

    tracing::info!(container, prefix, kind = %kind, rows = records.len(), "Starting export bulk");

    for (index, record) in records.iter().enumerate() {
        let row = index + 1;
        let key = export_key(prefix, record.course_id);
        crate::log_row_start!(row, records.len(), &key);

        let exported = match kind {
            ExportKind::Grades => export_grades(client, store, record.course_id, container, &key)
                .await
                .map(|_| ()),
            ExportKind::Users => {
                export_course_users(client, store, record.course_id, container, &key)
                    .await
                    .map(|_| ())
            }
        };

        match exported {
            Ok(()) => summary.record_success(),
            Err(e) => {
                crate::log_row_failure!(row, &key, &e);
                summary.record_failure(RowError::new(row, key, e.to_string()));
            }
        }
    }

    let summary = summary.with_duration(start.elapsed());
    summary.log_summary();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("s3grades", 1, "s3grades/1.json" ; "plain prefix")]
    #[test_case("grades/", 7, "grades/7.json" ; "trailing slash")]
    #[test_case("", 3, "3.json" ; "no prefix")]
    #[test_case("a/b", 12, "a/b/12.json" ; "nested prefix")]
    fn test_export_key(prefix: &str, course_id: i64, expected: &str) {
        assert_eq!(export_key(prefix, CourseId::new(course_id)), expected);
    }

    #[test_case("grades", ExportKind::Grades ; "grades")]
    #[test_case("Users", ExportKind::Users ; "users any case")]
    fn test_export_kind_parse(raw: &str, expected: ExportKind) {
        assert_eq!(raw.parse::<ExportKind>().unwrap(), expected);
    }

    #[test]
    fn test_export_kind_rejects_unknown() {
        let err = "quizzes".parse::<ExportKind>().unwrap_err();
        assert!(err.contains("quizzes"));
    }
}
