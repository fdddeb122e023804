//! External system integrations for moodlecli.
//!
//! This module provides adapters for the systems the CLI talks to:
//!
//! - [`moodle`] - Moodle REST web-service gateway
//! - [`storage`] - Blob storage for exported artifacts (trait-based)
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so orchestration can
//! be tested with in-process fakes: [`moodle::Transport`] sits under the
//! gateway and [`storage::BlobStore`] under every export.
//!
//! # Moodle Adapter
//!
//! ```rust,no_run
//! use moodlecli::adapters::moodle::MoodleClient;
//! use moodlecli::config::{secret_string, MoodleConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MoodleConfig {
//!     base_url: "https://moodle.example.com".to_string(),
//!     token: secret_string("token".to_string()),
//!     timeout_seconds: 600,
//! };
//!
//! let client = MoodleClient::from_config(&config)?;
//! let role = client.get_role_by_shortname("student").await?;
//! println!("student role id: {}", role.id);
//! # Ok(())
//! # }
//! ```
//!
//! # Storage Adapter
//!
//! ```rust,no_run
//! use moodlecli::adapters::storage::{get_json_or, put_json, LocalBlobStore};
//!
//! # async fn example() -> moodlecli::domain::Result<()> {
//! let store = LocalBlobStore::new("storage");
//! let previous = get_json_or(&store, "exports", "7.json", serde_json::json!({})).await?;
//! put_json(&store, "exports", "7.json", &previous).await?;
//! # Ok(())
//! # }
//! ```

pub mod moodle;
pub mod storage;
