//! Chat backend implementations
//!
//! ## Architecture
//!
//! Both backend categories share one streaming pipeline (`HttpBackend`) and
//! differ only in their `WireProtocol`:
//!
//! - `CommercialProtocol`: `POST /chat/completions`, bearer auth, SSE frames
//! - `LocalProtocol`: `POST /api/chat`, no auth, one JSON object per chunk
//!
//! The protocol picks the `FrameDecoder` used on the response body.
//! `MockBackend` is kept for testing purposes.

mod traits;
mod error;
mod decoder;
mod pipeline;
mod commercial;
mod local;
mod mock;

// Core traits and types
pub use traits::{ChatBackend, ChatResponse, ProgressFn, WireProtocol};
pub use error::{StreamError, StreamResult};

// Streaming pipeline
pub use decoder::{
    FrameDecoder, JsonChunkDecoder, SseFrameDecoder, Utf8ChunkDecoder,
    CHAT_CHUNK_DELTA_POINTER, SSE_DELTA_POINTER,
};
pub use pipeline::{build_http_client, read_stream, HttpBackend};

// Wire protocols
pub use commercial::CommercialProtocol;
pub use local::LocalProtocol;

// Mock backend for testing
pub use mock::{MockBackend, MockCall, MockMode};

/// Backend for commercial SSE endpoints
pub type CommercialBackend = HttpBackend<CommercialProtocol>;

/// Backend for local chat endpoints
pub type LocalBackend = HttpBackend<LocalProtocol>;
