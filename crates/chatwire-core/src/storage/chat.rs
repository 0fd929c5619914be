//! Chat persistence over a blob store

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::types::{AiModel, ChatMessage};
use super::traits::{BlobStore, StorageResult};

/// Key holding the configured models
pub const MODELS_KEY: &str = "ai-chat-models";

/// Key holding the conversation messages
pub const MESSAGES_KEY: &str = "ai-chat-messages";

/// Saves and loads models and messages as JSON blobs
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use chatwire_core::storage::{ChatStorage, MemoryBlobStore};
///
/// let storage = ChatStorage::new(Arc::new(MemoryBlobStore::new()));
/// assert!(storage.load_models().unwrap().is_empty());
/// ```
#[derive(Clone)]
pub struct ChatStorage {
    store: Arc<dyn BlobStore>,
}

impl ChatStorage {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Underlying blob store
    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    pub fn save_models(&self, models: &[AiModel]) -> StorageResult<()> {
        self.save(MODELS_KEY, models)
    }

    pub fn load_models(&self) -> StorageResult<Vec<AiModel>> {
        self.load(MODELS_KEY)
    }

    pub fn save_messages(&self, messages: &[ChatMessage]) -> StorageResult<()> {
        self.save(MESSAGES_KEY, messages)
    }

    pub fn load_messages(&self) -> StorageResult<Vec<ChatMessage>> {
        self.load(MESSAGES_KEY)
    }

    fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        self.store.set(key, &serde_json::to_string(value)?)
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Vec<T>> {
        match self.store.get(key)? {
            Some(blob) => Ok(serde_json::from_str(&blob)?),
            None => Ok(Vec::new()),
        }
    }
}

impl std::fmt::Debug for ChatStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatStorage")
            .field("store", &self.store.name())
            .finish()
    }
}
