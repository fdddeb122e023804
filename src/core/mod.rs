//! Core business logic for moodlecli.
//!
//! Every operation takes its [`MoodleClient`](crate::adapters::moodle::MoodleClient)
//! (and, for exports, its [`BlobStore`](crate::adapters::storage::BlobStore))
//! as an explicit argument.
//!
//! # Modules
//!
//! - [`users`] - Get-or-create resolution of users by email
//! - [`provision`] - Course provisioning by duplication, with timeout recovery
//! - [`grades`] - Incremental grade synchronization
//! - [`exports`] - User, identity and policy exports
//! - [`batch`] - CSV-driven bulk commands
//! - [`secrets`] - Enrolment key and password generation
//!
//! # Example
//!
//! ```rust,no_run
//! use moodlecli::adapters::moodle::MoodleClient;
//! use moodlecli::config::load_config;
//! use moodlecli::core::provision::{CourseRoles, Provisioner, RecoveryPolicy};
//! use moodlecli::domain::{CourseId, CourseRecord};
//!
//! # async fn example(record: CourseRecord) -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("moodlecli.toml")?;
//! let client = MoodleClient::from_config(&config.moodle)?;
//!
//! let roles = CourseRoles::lookup(&client, &config.provisioning).await?;
//! let provisioner = Provisioner::new(&client, RecoveryPolicy::from(&config.provisioning));
//! let record = provisioner.provision(CourseId::new(2), record, roles).await?;
//!
//! println!("Enrolment key: {:?}", record.course_enrolment_key);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod exports;
pub mod grades;
pub mod provision;
pub mod secrets;
pub mod users;
