//! In-memory blob store

use std::collections::HashMap;

use parking_lot::RwLock;

use super::traits::{BlobStore, StorageResult};

/// In-memory blob store for testing and ephemeral use
///
/// Blobs are lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryBlobStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory store with initial values
    pub fn with_blobs(initial: HashMap<String, String>) -> Self {
        Self {
            blobs: RwLock::new(initial),
        }
    }

    /// Get the number of blobs in the store
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStore for MemoryBlobStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.blobs.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.blobs.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.blobs.write().remove(key);
        Ok(())
    }
}
