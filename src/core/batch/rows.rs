//! CSV row contracts for the bulk commands
//!
//! Every bulk command reads a CSV file with a header row. Columns are matched
//! by name, so their order does not matter and extra columns are ignored.
//! A file that lacks a required column is rejected before any row runs.

use crate::domain::ids::CourseId;
use crate::domain::{AuthMethod, CourseRecord, MoodleCliError, Result, UserIdentity};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// One row of an enrol bulk input file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrolRecord {
    pub user_firstname: String,
    pub user_lastname: String,
    pub user_email: String,
    pub user_auth_type: String,
}

impl EnrolRecord {
    pub const FIELDS: [&'static str; 4] =
        ["user_firstname", "user_lastname", "user_email", "user_auth_type"];

    pub fn identity(&self) -> UserIdentity {
        UserIdentity::new(
            self.user_firstname.clone(),
            self.user_lastname.clone(),
            self.user_email.clone(),
            AuthMethod::from(self.user_auth_type.clone()),
        )
    }
}

/// One row of an import or export bulk input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseIdRecord {
    pub course_id: CourseId,
}

impl CourseIdRecord {
    pub const FIELDS: [&'static str; 1] = ["course_id"];
}

/// Reads every row of a CSV document
///
/// # Arguments
///
/// * `reader` - CSV source with a header row
/// * `required` - Columns that must be present in the header
///
/// # Errors
///
/// Returns [`MoodleCliError::Csv`] if a required column is missing or a row
/// cannot be parsed. The error names the 1-based data row.
pub fn read_records<T, R>(reader: R, required: &[&str]) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers()?.clone();
    let present: HashSet<&str> = headers.iter().collect();
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|h| !present.contains(h))
        .collect();
    if !missing.is_empty() {
        return Err(MoodleCliError::Csv(format!(
            "CSV missing required columns: {}",
            missing.join(", ")
        )));
    }

    let mut records = Vec::new();
    for (index, row) in rdr.deserialize::<T>().enumerate() {
        let record = row.map_err(|e| MoodleCliError::Csv(format!("Row {}: {}", index + 1, e)))?;
        records.push(record);
    }
    Ok(records)
}

/// Reads every row of the CSV file at `path`
pub fn read_records_from_path<T>(path: &Path, required: &[&str]) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    let file = File::open(path).map_err(|e| {
        MoodleCliError::Io(format!("Failed to open {}: {}", path.display(), e))
    })?;
    read_records(file, required)
}

/// Writes `records` under an explicit header row
///
/// The header is always written, so an empty slice still yields a valid
/// CSV document. Missing optional values are written as empty cells.
pub fn write_records<T, W>(writer: W, header: &[&str], records: &[T]) -> Result<()>
where
    T: Serialize,
    W: Write,
{
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(header)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()
        .map_err(|e| MoodleCliError::Io(format!("Failed to flush CSV: {e}")))?;
    Ok(())
}

/// Writes `records` to the CSV file at `path`, replacing it
pub fn write_records_to_path<T>(path: &Path, header: &[&str], records: &[T]) -> Result<()>
where
    T: Serialize,
{
    let file = File::create(path).map_err(|e| {
        MoodleCliError::Io(format!("Failed to create {}: {}", path.display(), e))
    })?;
    write_records(file, header, records)
}

/// Input templates produced by the `*-bulk-csv` commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    CourseBulk,
    EnrolBulk,
    ImportBulk,
    ExportBulk,
}

impl Template {
    pub fn header(self) -> &'static [&'static str] {
        match self {
            Template::CourseBulk => &CourseRecord::INPUT_FIELDS,
            Template::EnrolBulk => &EnrolRecord::FIELDS,
            Template::ImportBulk | Template::ExportBulk => &CourseIdRecord::FIELDS,
        }
    }
}

/// Writes an empty input file holding only the header of `template`
pub fn write_template(path: &Path, template: Template) -> Result<()> {
    write_records_to_path::<CourseIdRecord>(path, template.header(), &[])?;
    tracing::info!(path = %path.display(), ?template, "CSV template written");
    Ok(())
}
