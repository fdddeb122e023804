//! Blob store commands
//!
//! These commands only touch the local blob store and do not need a Moodle
//! connection.

use super::{blob_store, load, print_json, report_failure, EXIT_OK};
use crate::adapters::storage::BlobStore;
use clap::Args;

/// Arguments for the containers command
#[derive(Args, Debug)]
pub struct ContainersArgs {}

impl ContainersArgs {
    /// Execute the containers command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let store = blob_store(&config);

        match store.list_containers().await {
            Ok(containers) => {
                print_json(&containers)?;
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("containers", &e)),
        }
    }
}

/// Arguments for the commands addressing one container
#[derive(Args, Debug)]
pub struct ContainerArgs {
    /// Container name
    pub container: String,
}

impl ContainerArgs {
    /// Execute the container-keys command
    pub async fn list_keys(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let store = blob_store(&config);

        match store.list_keys(&self.container).await {
            Ok(keys) => {
                print_json(&keys)?;
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("container-keys", &e)),
        }
    }

    /// Execute the create-container command
    pub async fn create(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let store = blob_store(&config);

        match store.create_container(&self.container).await {
            Ok(()) => {
                println!("Container '{}' ready", self.container);
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("create-container", &e)),
        }
    }
}

/// Arguments for the show-blob command
#[derive(Args, Debug)]
pub struct ShowBlobArgs {
    /// Container name
    pub container: String,

    /// Blob key
    pub key: String,
}

impl ShowBlobArgs {
    /// Execute the show-blob command
    ///
    /// JSON blobs are pretty-printed; anything else is printed as text.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let store = blob_store(&config);

        let bytes = match store.get(&self.container, &self.key).await {
            Ok(bytes) => bytes,
            Err(e) => return Ok(report_failure("show-blob", &e)),
        };

        match serde_json::from_slice::<serde_json::Value>(&bytes) {
            Ok(value) => print_json(&value)?,
            Err(_) => println!("{}", String::from_utf8_lossy(&bytes)),
        }
        Ok(EXIT_OK)
    }
}
