//! Core types for chat dispatch
//!
//! This module contains the shared types used by the dispatcher, the wire
//! protocols and the persistence layer.

mod message;
mod model;
mod stream;
mod cancellation;

pub use message::{ChatMessage, MessageRole, MessageStatus};
pub use model::{AiModel, ModelCategory};
pub use stream::StreamFrame;
pub use cancellation::{CancellationRegistry, CancellationToken};
