//! Persistence for models and conversations
//!
//! - `BlobStore`: key-value string storage
//! - `MemoryBlobStore`: In-memory for testing
//! - `FileBlobStore`: One JSON file per key
//! - `ChatStorage`: Typed save/load of models and messages

mod traits;
mod memory;
mod file;
mod chat;

pub use traits::{BlobStore, StorageError, StorageResult};
pub use memory::MemoryBlobStore;
pub use file::FileBlobStore;
pub use chat::{ChatStorage, MESSAGES_KEY, MODELS_KEY};
