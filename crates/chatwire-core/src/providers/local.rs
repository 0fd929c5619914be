//! Local backend protocol
//!
//! Ollama-style chat API: `POST {endpoint}/api/chat` without credentials,
//! streamed back as one JSON object per chunk with the delta at
//! `message.content`. Error bodies look like `{"error":"model not found"}`.

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::config::DispatchSettings;
use crate::types::{AiModel, ChatMessage};
use super::decoder::{FrameDecoder, JsonChunkDecoder};
use super::error::{StreamError, StreamResult};
use super::pipeline::{status_text, WireMessage};
use super::traits::WireProtocol;

#[derive(Debug, Serialize)]
struct LocalChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

/// Chat protocol for local, unauthenticated endpoints
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalProtocol;

impl LocalProtocol {
    pub fn new() -> Self {
        Self
    }
}

impl WireProtocol for LocalProtocol {
    fn name(&self) -> &'static str {
        "local"
    }

    fn path(&self) -> &'static str {
        "/api/chat"
    }

    fn build_request(
        &self,
        client: &reqwest::Client,
        model: &AiModel,
        messages: &[ChatMessage],
        _settings: &DispatchSettings,
    ) -> StreamResult<reqwest::RequestBuilder> {
        let endpoint = model
            .endpoint()
            .ok_or_else(|| StreamError::missing_endpoint(&model.id))?;

        let body = LocalChatRequest {
            model: &model.name,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            stream: true,
        };

        Ok(client
            .post(format!("{}{}", endpoint, self.path()))
            .header(CONTENT_TYPE, "application/json")
            .json(&body))
    }

    fn error_from_response(&self, status: StatusCode, body: &str) -> StreamError {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| match v.get("error") {
                Some(Value::String(s)) => Some(s.clone()),
                Some(other) => other.get("message").and_then(Value::as_str).map(str::to_string),
                None => None,
            })
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status_text(status));
        StreamError::local_api_call_failed(status.as_u16(), message)
    }

    fn decoder(&self) -> Box<dyn FrameDecoder> {
        Box::new(JsonChunkDecoder::new())
    }
}
