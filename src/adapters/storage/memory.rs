//! In-memory blob store

use super::traits::BlobStore;
use crate::domain::{Result, StorageError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

type Containers = BTreeMap<String, BTreeMap<String, Vec<u8>>>;

/// [`BlobStore`] held in process memory
///
/// Writing to a container that does not exist creates it.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    containers: Mutex<Containers>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Containers>> {
        self.containers
            .lock()
            .map_err(|_| StorageError::Io("memory store lock poisoned".to_string()).into())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>> {
        self.lock()?
            .get(container)
            .and_then(|blobs| blobs.get(key))
            .cloned()
            .ok_or_else(|| {
                StorageError::NotFound {
                    container: container.to_string(),
                    key: key.to_string(),
                }
                .into()
            })
    }

    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.lock()?
            .entry(container.to_string())
            .or_default()
            .insert(key.to_string(), bytes);
        Ok(())
    }

    async fn list_containers(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    async fn list_keys(&self, container: &str) -> Result<Vec<String>> {
        self.lock()?
            .get(container)
            .map(|blobs| blobs.keys().cloned().collect())
            .ok_or_else(|| {
                StorageError::NotFound {
                    container: container.to_string(),
                    key: String::new(),
                }
                .into()
            })
    }

    async fn create_container(&self, container: &str) -> Result<()> {
        self.lock()?.entry(container.to_string()).or_default();
        Ok(())
    }
}
