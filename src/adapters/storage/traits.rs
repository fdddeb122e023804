//! Blob store abstraction
//!
//! Exported artifacts are opaque byte blobs addressed by (container, key).
//! The JSON helpers layer the grade tree and other exports on top of the
//! raw get/put pair.

use crate::domain::{MoodleCliError, Result, StorageError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Key/value blob storage grouped into containers
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Reads a blob
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the container or key does not
    /// exist.
    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>>;

    /// Writes a blob, replacing any previous value under the same key
    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<()>;

    /// Names of every container, sorted
    async fn list_containers(&self) -> Result<Vec<String>>;

    /// Keys stored in a container, sorted
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the container does not exist.
    async fn list_keys(&self, container: &str) -> Result<Vec<String>>;

    /// Creates an empty container; creating an existing one is a no-op
    async fn create_container(&self, container: &str) -> Result<()>;
}

/// Reads a JSON blob, or returns `default` if it does not exist
///
/// # Errors
///
/// Returns an error if the blob exists but cannot be read or parsed.
pub async fn get_json_or<T: DeserializeOwned>(
    store: &dyn BlobStore,
    container: &str,
    key: &str,
    default: T,
) -> Result<T> {
    match store.get(container, key).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
            MoodleCliError::Serialization(format!("{container}/{key} is not valid JSON: {e}"))
        }),
        Err(MoodleCliError::Storage(StorageError::NotFound { .. })) => {
            tracing::debug!(container, key, "No stored value, using default");
            Ok(default)
        }
        Err(e) => Err(e),
    }
}

/// Serializes `value` as JSON and writes it
pub async fn put_json<T: Serialize + ?Sized>(
    store: &dyn BlobStore,
    container: &str,
    key: &str,
    value: &T,
) -> Result<()> {
    let bytes = serde_json::to_vec(value)?;
    tracing::debug!(container, key, size = bytes.len(), "Writing JSON blob");
    store.put(container, key, bytes).await
}
