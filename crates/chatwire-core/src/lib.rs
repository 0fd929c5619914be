//! chatwire core
//!
//! Streaming chat dispatch over HTTP. A `ChatDispatcher` routes each call by
//! model category to one of two backends sharing a single streaming pipeline:
//!
//! - commercial: OpenAI-style `/chat/completions` with server-sent events
//! - local: Ollama-style `/api/chat` with one JSON object per chunk
//!
//! Every call resolves to a `ChatResponse` carrying the accumulated text and,
//! on failure, a classified `StreamError`. Progress is reported with the
//! cumulative text after each decoded delta.
//!
//! ## Cancellation
//!
//! `send_message` registers the call in the dispatcher's single-slot
//! `CancellationRegistry`, and `cancel_stream` aborts whichever call holds
//! the slot. Callers that run several streams at once should use
//! `send_message_with_token` and keep their own `CancellationToken`.
//!
//! ```rust,ignore
//! use chatwire_core::{ChatDispatcher, NoOpLogger, DispatchSettings};
//!
//! let dispatcher = ChatDispatcher::new(DispatchSettings::default(), Arc::new(NoOpLogger))?;
//! let response = dispatcher.send_message(&model, &history, Some(&mut on_progress)).await;
//!
//! // elsewhere
//! dispatcher.cancel_stream();
//! ```

pub mod types;
pub mod logging;
pub mod config;
pub mod providers;
pub mod storage;
pub mod dispatcher;

// Re-export commonly used types
pub use types::{
    AiModel, ModelCategory,
    ChatMessage, MessageRole, MessageStatus,
    StreamFrame,
    CancellationRegistry, CancellationToken,
};

pub use logging::{Logger, LogLevel, SharedLogger, NoOpLogger, ConsoleLogger, MemoryLogger};

pub use config::{
    ConfigProvider, ConfigError, ConfigResult, DispatchSettings,
    MemoryConfigProvider, FileConfigProvider,
};

pub use providers::{
    ChatBackend, ChatResponse, ProgressFn, StreamError, StreamResult,
    WireProtocol, HttpBackend, CommercialProtocol, LocalProtocol,
    FrameDecoder, SseFrameDecoder, JsonChunkDecoder,
    MockBackend, MockMode,
};

pub use storage::{
    BlobStore, StorageError, StorageResult,
    MemoryBlobStore, FileBlobStore, ChatStorage,
};

pub use dispatcher::ChatDispatcher;
