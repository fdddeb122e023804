//! Blob storage for exported artifacts
//!
//! - [`LocalBlobStore`] - directory-per-container store on the local filesystem
//! - [`MemoryBlobStore`] - in-process store

pub mod local;
pub mod memory;
pub mod traits;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;
pub use traits::{get_json_or, put_json, BlobStore};
