//! Backend and wire protocol trait definitions

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::config::DispatchSettings;
use crate::types::{AiModel, CancellationToken, ChatMessage};
use super::decoder::FrameDecoder;
use super::error::{StreamError, StreamResult};

/// Progress callback, invoked with the cumulative content decoded so far
pub type ProgressFn<'a> = &'a mut (dyn FnMut(&str) + Send);

/// Outcome of one streaming call
///
/// On failure `content` still holds whatever was decoded before the error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatResponse {
    /// Accumulated assistant text
    pub content: String,
    /// Classified failure, if the call did not complete normally
    pub error: Option<StreamError>,
}

impl ChatResponse {
    /// A completed response
    pub fn completed(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            error: None,
        }
    }

    /// A failed response carrying the partial content
    pub fn failed(content: impl Into<String>, error: StreamError) -> Self {
        Self {
            content: content.into(),
            error: Some(error),
        }
    }

    /// Whether the stream completed without error
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Whether the caller cancelled the stream
    pub fn is_canceled(&self) -> bool {
        self.error.as_ref().is_some_and(StreamError::is_canceled)
    }

    /// User-facing error text
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Classification tag of the error
    pub fn error_code(&self) -> Option<&'static str> {
        self.error.as_ref().map(StreamError::code)
    }

    /// Convert into a `Result`, dropping partial content on failure
    pub fn into_result(self) -> StreamResult<String> {
        match self.error {
            None => Ok(self.content),
            Some(err) => Err(err),
        }
    }
}

/// Serializes as `{content, error?}` with the error's message text
impl Serialize for ChatResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.error.is_some() { 2 } else { 1 };
        let mut state = serializer.serialize_struct("ChatResponse", len)?;
        state.serialize_field("content", &self.content)?;
        if let Some(message) = self.error_message() {
            state.serialize_field("error", &message)?;
        }
        state.end()
    }
}

/// Wire-level description of one backend category
///
/// A protocol knows how to address and authenticate a request, how to read
/// an error body, and which frame decoder its streaming body needs. The
/// streaming loop itself is shared.
pub trait WireProtocol: Send + Sync {
    /// Protocol name used in logs
    fn name(&self) -> &'static str;

    /// Path appended to the model's endpoint, e.g. `/chat/completions`
    fn path(&self) -> &'static str;

    /// Validate the model and build the full request
    fn build_request(
        &self,
        client: &reqwest::Client,
        model: &AiModel,
        messages: &[ChatMessage],
        settings: &DispatchSettings,
    ) -> StreamResult<reqwest::RequestBuilder>;

    /// Classify a non-2xx response from its status and raw body
    fn error_from_response(&self, status: StatusCode, body: &str) -> StreamError;

    /// Fresh decoder for one response body
    fn decoder(&self) -> Box<dyn FrameDecoder>;
}

/// A backend that can stream a chat completion
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Backend name used in logs
    fn name(&self) -> &str;

    /// Stream a completion for `messages`
    ///
    /// Never fails outright: every error is folded into the returned
    /// `ChatResponse`. `on_progress` is not called after this returns.
    async fn stream_chat(
        &self,
        model: &AiModel,
        messages: &[ChatMessage],
        cancel: &CancellationToken,
        on_progress: Option<ProgressFn<'_>>,
    ) -> ChatResponse;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_serialization() {
        let ok = serde_json::to_value(ChatResponse::completed("Hi")).unwrap();
        assert_eq!(ok, serde_json::json!({"content": "Hi"}));

        let canceled =
            serde_json::to_value(ChatResponse::failed("par", StreamError::Canceled)).unwrap();
        assert_eq!(canceled, serde_json::json!({"content": "par", "error": "CANCELED"}));
    }

    #[test]
    fn test_response_accessors() {
        let resp = ChatResponse::failed("", StreamError::api_call_failed(401, "X"));
        assert!(!resp.is_ok());
        assert!(!resp.is_canceled());
        assert_eq!(resp.error_message().as_deref(), Some("X"));
        assert_eq!(resp.error_code(), Some("API_CALL_FAILED"));
        assert!(resp.into_result().is_err());

        assert_eq!(ChatResponse::completed("done").into_result().unwrap(), "done");
    }
}
