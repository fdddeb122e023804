// moodlecli - Moodle course administration tool
// Copyright (c) 2025 moodlecli Contributors
// Licensed under the MIT License

//! # moodlecli - Moodle course administration
//!
//! moodlecli drives a Moodle site through its REST web service to set up
//! courses in bulk, enrol users, and export grades and user data.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Provisioning** courses by duplicating a base course, enrolling the
//!   instructor and opening a keyed student self enrolment
//! - **Enrolling** users in bulk, creating accounts that do not exist yet
//! - **Exporting** grade trees incrementally, reusing expensive quiz attempt
//!   data from the previous export
//! - **Storing** exports as JSON blobs
//!
//! ## Architecture
//!
//! moodlecli follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (provisioning, grade sync, bulk commands)
//! - [`adapters`] - External integrations (Moodle web service, blob store)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use moodlecli::adapters::moodle::MoodleClient;
//! use moodlecli::adapters::storage::LocalBlobStore;
//! use moodlecli::config::load_config;
//! use moodlecli::core::grades::export_grades;
//! use moodlecli::domain::CourseId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("moodlecli.toml")?;
//!     config.moodle.validate()?;
//!
//!     let client = MoodleClient::from_config(&config.moodle)?;
//!     let store = LocalBlobStore::new(&config.storage.root);
//!
//!     let tree = export_grades(&client, &store, CourseId::new(21), "exports", "grades/21.json").await?;
//!     println!("Exported grades of {} users", tree.usergrades.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Incremental Grade Export
//!
//! Grade items are fetched on every run. Quiz attempt summaries for a user
//! and quiz are fetched again only when the grade was submitted after the
//! newest graded notification in the cached summaries, and attempt reviews
//! are fetched once per attempt.
//!
//! ## Error Handling
//!
//! moodlecli uses the [`domain::MoodleCliError`] type for all errors:
//!
//! ```rust,no_run
//! use moodlecli::domain::MoodleCliError;
//!
//! fn example() -> Result<(), MoodleCliError> {
//!     let config = moodlecli::config::load_config("moodlecli.toml")?;
//!     println!("{}", config.storage.root);
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! moodlecli uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(course_id = 21, "Starting export");
//! warn!(shortname = "alg1", "Duplication request lost");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
