//! Batch summary and reporting
//!
//! This module defines structures for tracking and reporting the outcome of
//! a bulk command.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// A row that failed, with the error that stopped it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based data row number
    pub row: usize,

    /// What the row was about (course short name, email, course id)
    pub item: String,

    /// Error message
    pub message: String,
}

impl RowError {
    /// Create a new row error
    pub fn new(row: usize, item: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row,
            item: item.into(),
            message: message.into(),
        }
    }
}

/// Summary of a bulk operation
#[derive(Debug, Clone)]
pub struct BatchSummary {
    /// Name of the bulk operation
    pub operation: &'static str,

    /// When the batch started
    pub started_at: DateTime<Utc>,

    /// Number of rows in the input file
    pub total_rows: usize,

    /// Number of rows that completed
    pub succeeded: usize,

    /// Number of rows that failed
    pub failed: usize,

    /// Duration of the batch
    pub duration: Duration,

    /// Errors encountered, one per failed row
    pub errors: Vec<RowError>,
}

impl BatchSummary {
    /// Create a new empty summary for a batch of `total_rows`
    pub fn new(operation: &'static str, total_rows: usize) -> Self {
        Self {
            operation,
            started_at: Utc::now(),
            total_rows,
            succeeded: 0,
            failed: 0,
            duration: Duration::from_secs(0),
            errors: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record a completed row
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    /// Record a failed row
    pub fn record_failure(&mut self, error: RowError) {
        self.failed += 1;
        self.errors.push(error);
    }

    /// Rows never attempted because the batch stopped early
    pub fn skipped(&self) -> usize {
        self.total_rows.saturating_sub(self.succeeded + self.failed)
    }

    /// Check if every row completed
    pub fn is_successful(&self) -> bool {
        self.failed == 0 && self.skipped() == 0
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_rows == 0 {
            return 100.0;
        }
        (self.succeeded as f64 / self.total_rows as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        crate::log_batch_complete!(self.operation, self.succeeded, self.failed, self.duration);
        tracing::info!(
            operation = self.operation,
            started_at = %self.started_at.to_rfc3339(),
            total_rows = self.total_rows,
            skipped = self.skipped(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Batch summary"
        );

        for error in &self.errors {
            tracing::warn!(
                operation = self.operation,
                row = error.row,
                item = %error.item,
                message = %error.message,
                "Batch row error"
            );
        }
    }
}
