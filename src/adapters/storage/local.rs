//! Filesystem blob store
//!
//! Each container is a directory under the configured root and each key a
//! file path relative to its container, so `exports` / `grades/7.json` lands
//! at `<root>/exports/grades/7.json`.
//!
//! Writes are staged under `<root>/.staging` and renamed into place, so an
//! interrupted write never shows up as a key. Names starting with `.` are
//! reserved and cannot be used as containers.

use super::traits::BlobStore;
use crate::domain::{MoodleCliError, Result, StorageError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const STAGING_DIR: &str = ".staging";

/// [`BlobStore`] backed by a local directory tree
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Creates a store rooted at `root`; the directory is created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn container_path(&self, container: &str) -> Result<PathBuf> {
        if container.is_empty() || container.starts_with('.') || container.contains(['/', '\\']) {
            return Err(StorageError::InvalidKey(format!("invalid container name '{container}'")).into());
        }
        Ok(self.root.join(container))
    }

    fn blob_path(&self, container: &str, key: &str) -> Result<PathBuf> {
        let mut path = self.container_path(container)?;
        let relative = key.trim_start_matches('/');
        if relative.is_empty() {
            return Err(StorageError::InvalidKey(format!("empty key in container '{container}'")).into());
        }
        for segment in relative.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
                return Err(StorageError::InvalidKey(format!("invalid key '{key}'")).into());
            }
            path.push(segment);
        }
        Ok(path)
    }
}

fn not_found(container: &str, key: &str) -> MoodleCliError {
    StorageError::NotFound {
        container: container.to_string(),
        key: key.to_string(),
    }
    .into()
}

fn io_error(path: &Path, err: std::io::Error) -> MoodleCliError {
    StorageError::Io(format!("{}: {err}", path.display())).into()
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(container, key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found(container, key)),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<()> {
        let path = self.blob_path(container, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }

        // Write then rename so readers never see a half-written blob
        let staging = self.root.join(STAGING_DIR);
        tokio::fs::create_dir_all(&staging)
            .await
            .map_err(|e| io_error(&staging, e))?;
        let tmp = staging.join(format!("{:016x}.tmp", rand::random::<u64>()));
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(&path, e))?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "Stored blob");
        Ok(())
    }

    async fn list_containers(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&self.root, e)),
        };

        let mut containers = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error(&self.root, e))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map_err(|e| io_error(&entry.path(), e))?
                .is_dir();
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_dir && !name.starts_with('.') {
                containers.push(name);
            }
        }
        containers.sort();
        Ok(containers)
    }

    async fn list_keys(&self, container: &str) -> Result<Vec<String>> {
        let base = self.container_path(container)?;
        if !tokio::fs::try_exists(&base)
            .await
            .map_err(|e| io_error(&base, e))?
        {
            return Err(not_found(container, ""));
        }

        let mut keys = Vec::new();
        let mut pending = vec![base.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| io_error(&dir, e))?;
            while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(&dir, e))? {
                let path = entry.path();
                let file_type = entry.file_type().await.map_err(|e| io_error(&path, e))?;
                if file_type.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(&base) {
                    let key = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/");
                    keys.push(key);
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn create_container(&self, container: &str) -> Result<()> {
        let path = self.container_path(container)?;
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| io_error(&path, e))?;
        tracing::info!(container, path = %path.display(), "Container ready");
        Ok(())
    }
}
