//! Mock backend for testing
//!
//! Provides deterministic, configurable streams without network access.
//! Useful for exercising dispatch, progress callbacks and cancellation.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

use super::error::StreamError;
use super::traits::{ChatBackend, ChatResponse, ProgressFn};
use crate::types::{AiModel, CancellationToken, ChatMessage, MessageRole};

/// Mock response mode
#[derive(Debug, Clone, Default)]
pub enum MockMode {
    /// Echo back the last user message
    #[default]
    Echo,
    /// Stream these deltas in order
    Chunks(Vec<String>),
    /// Stream `delay_chunks` deltas, then fail with `error`
    Error { error: StreamError, delay_chunks: usize },
    /// Stream nothing
    Empty,
}

/// A call observed by the mock
#[derive(Debug, Clone)]
pub struct MockCall {
    pub model_id: String,
    pub message_count: usize,
}

/// Mock chat backend
pub struct MockBackend {
    name: String,
    mode: MockMode,
    chunk_delay_ms: u64,
    calls: Mutex<Vec<MockCall>>,
}

impl MockBackend {
    /// Create a mock with the given name and mode
    pub fn new(name: impl Into<String>, mode: MockMode) -> Self {
        Self {
            name: name.into(),
            mode,
            chunk_delay_ms: 0,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create an echo mock
    pub fn echo(name: impl Into<String>) -> Self {
        Self::new(name, MockMode::Echo)
    }

    /// Create a mock streaming the given deltas
    pub fn chunked(name: impl Into<String>, chunks: Vec<String>) -> Self {
        Self::new(name, MockMode::Chunks(chunks))
    }

    /// Create a mock failing with `error` after `delay_chunks` deltas
    pub fn failing(name: impl Into<String>, error: StreamError, delay_chunks: usize) -> Self {
        Self::new(name, MockMode::Error { error, delay_chunks })
    }

    /// Set the delay before each delta after the first
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.chunk_delay_ms = delay_ms;
        self
    }

    /// Calls observed so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Number of calls observed so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn last_user_message(messages: &[ChatMessage]) -> String {
        messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User && !m.content.is_empty())
            .map(|m| m.content.clone())
            .unwrap_or_else(|| "Hello from MockBackend!".to_string())
    }

    fn plan(&self, messages: &[ChatMessage]) -> (Vec<String>, Option<StreamError>) {
        match &self.mode {
            MockMode::Echo => (vec![format!("Echo: {}", Self::last_user_message(messages))], None),
            MockMode::Chunks(chunks) => (chunks.clone(), None),
            MockMode::Error { error, delay_chunks } => (
                (0..*delay_chunks).map(|i| format!("Chunk {} before error. ", i)).collect(),
                Some(error.clone()),
            ),
            MockMode::Empty => (Vec::new(), None),
        }
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn stream_chat(
        &self,
        model: &AiModel,
        messages: &[ChatMessage],
        cancel: &CancellationToken,
        mut on_progress: Option<ProgressFn<'_>>,
    ) -> ChatResponse {
        self.calls.lock().push(MockCall {
            model_id: model.id.clone(),
            message_count: messages.len(),
        });

        let (chunks, error) = self.plan(messages);
        let mut content = String::new();

        for (i, chunk) in chunks.into_iter().enumerate() {
            if i > 0 && self.chunk_delay_ms > 0 {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(Duration::from_millis(self.chunk_delay_ms)) => {}
                }
            }
            if cancel.is_cancelled() {
                return ChatResponse::failed(content, StreamError::Canceled);
            }

            content.push_str(&chunk);
            if let Some(callback) = on_progress.as_deref_mut() {
                callback(&content);
            }
        }

        match error {
            Some(err) => ChatResponse::failed(content, err),
            None => ChatResponse::completed(content),
        }
    }
}
