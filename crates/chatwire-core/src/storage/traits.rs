//! Core traits and types for blob storage

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Other(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for key-value blob storage
///
/// Implementations can be:
/// - In-memory for testing (`MemoryBlobStore`)
/// - One file per key (`FileBlobStore`)
/// - Custom implementations (browser storage bridges, databases, etc.)
///
/// # Example
///
/// ```
/// use chatwire_core::storage::{BlobStore, MemoryBlobStore};
///
/// let store = MemoryBlobStore::new();
/// store.set("ai-chat-models", "[]").unwrap();
/// assert_eq!(store.get("ai-chat-models").unwrap(), Some("[]".to_string()));
/// ```
pub trait BlobStore: Send + Sync {
    /// Name of this store (for debugging/logging)
    fn name(&self) -> &str;

    /// Read the blob stored under `key`, `None` if absent
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous blob
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove the blob stored under `key`; absent keys are not an error
    fn remove(&self, key: &str) -> StorageResult<()>;
}
