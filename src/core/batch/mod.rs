//! Bulk commands driven by CSV files
//!
//! - [`rows`] - CSV row contracts and templates
//! - [`runner`] - Row-by-row orchestration of each bulk command
//! - [`summary`] - Per-batch counts and row errors

pub mod rows;
pub mod runner;
pub mod summary;

pub use rows::{CourseIdRecord, EnrolRecord, Template};
pub use runner::{course_bulk_setup, enrol_bulk, export_bulk, export_key, import_bulk, ExportKind};
pub use summary::{BatchSummary, RowError};
