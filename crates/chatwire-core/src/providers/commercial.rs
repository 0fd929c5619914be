//! Commercial backend protocol
//!
//! OpenAI-style chat completions over server-sent events:
//!
//! - `POST {endpoint}/chat/completions` with a bearer credential
//! - body `{messages, model, stream: true, temperature}`
//! - response frames `data: {"choices":[{"delta":{"content":"..."}}]}`,
//!   terminated by `data: [DONE]`
//! - error bodies `{"error":{"message":"..."}}`

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::config::DispatchSettings;
use crate::types::{AiModel, ChatMessage, MessageRole};
use super::decoder::{FrameDecoder, SseFrameDecoder};
use super::error::{StreamError, StreamResult};
use super::pipeline::{status_text, WireMessage};
use super::traits::WireProtocol;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    messages: Vec<WireMessage<'a>>,
    model: &'a str,
    stream: bool,
    temperature: f64,
}

/// Collapse a role onto the two roles the commercial API is sent
fn wire_role(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::System | MessageRole::Assistant => "assistant",
    }
}

/// SSE chat-completions protocol for commercial endpoints
#[derive(Debug, Clone, Copy, Default)]
pub struct CommercialProtocol;

impl CommercialProtocol {
    pub fn new() -> Self {
        Self
    }
}

impl WireProtocol for CommercialProtocol {
    fn name(&self) -> &'static str {
        "commercial"
    }

    fn path(&self) -> &'static str {
        "/chat/completions"
    }

    fn build_request(
        &self,
        client: &reqwest::Client,
        model: &AiModel,
        messages: &[ChatMessage],
        settings: &DispatchSettings,
    ) -> StreamResult<reqwest::RequestBuilder> {
        let endpoint = model
            .endpoint()
            .ok_or_else(|| StreamError::missing_endpoint(&model.id))?;
        let api_key = model
            .credential()
            .ok_or_else(|| StreamError::missing_api_key(&model.id))?;

        let body = CompletionRequest {
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: wire_role(m.role),
                    content: &m.content,
                })
                .collect(),
            model: &settings.commercial_model,
            stream: true,
            temperature: settings.temperature,
        };

        Ok(client
            .post(format!("{}{}", endpoint, self.path()))
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .header(ACCEPT, "text/event-stream")
            .json(&body))
    }

    fn error_from_response(&self, status: StatusCode, body: &str) -> StreamError {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(str::to_string))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status_text(status));
        StreamError::api_call_failed(status.as_u16(), message)
    }

    fn decoder(&self) -> Box<dyn FrameDecoder> {
        Box::new(SseFrameDecoder::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("0", "grok", "Be brief"),
            ChatMessage::user("1", "grok", "Hi"),
            ChatMessage::assistant("2", "grok", "Hello!"),
        ]
    }

    fn request_json(model: &AiModel, settings: &DispatchSettings) -> (reqwest::Request, Value) {
        let client = reqwest::Client::new();
        let request = CommercialProtocol
            .build_request(&client, model, &history(), settings)
            .unwrap()
            .build()
            .unwrap();
        let body = request.body().and_then(|b| b.as_bytes()).unwrap().to_vec();
        (request, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_request_shape() {
        let model = AiModel::commercial("grok", "Grok", "https://api.x.ai/v1/", "xai-secret");
        let (request, body) = request_json(&model, &DispatchSettings::default());

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "https://api.x.ai/v1/chat/completions");
        assert_eq!(request.headers()[AUTHORIZATION], "Bearer xai-secret");
        assert_eq!(request.headers()[ACCEPT], "text/event-stream");
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");

        assert_eq!(body["model"], "grok-beta");
        assert_eq!(body["stream"], true);
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(
            body["messages"],
            serde_json::json!([
                {"role": "assistant", "content": "Be brief"},
                {"role": "user", "content": "Hi"},
                {"role": "assistant", "content": "Hello!"},
            ])
        );
    }

    #[test]
    fn test_model_literal_comes_from_settings() {
        let model = AiModel::commercial("gpt", "GPT", "https://api.openai.com/v1", "sk");
        let settings = DispatchSettings::default().with_commercial_model("gpt-4o-mini");
        let (_, body) = request_json(&model, &settings);
        assert_eq!(body["model"], "gpt-4o-mini");
    }

    #[test]
    fn test_missing_endpoint_and_key() {
        let client = reqwest::Client::new();
        let settings = DispatchSettings::default();

        let no_endpoint = AiModel::new("grok", "Grok", "commercial").with_api_key("k");
        let err = CommercialProtocol
            .build_request(&client, &no_endpoint, &[], &settings)
            .unwrap_err();
        assert_eq!(err, StreamError::missing_endpoint("grok"));

        let no_key =
            AiModel::new("grok", "Grok", "commercial").with_endpoint("https://api.x.ai/v1");
        let err = CommercialProtocol
            .build_request(&client, &no_key, &[], &settings)
            .unwrap_err();
        assert_eq!(err, StreamError::missing_api_key("grok"));
    }

    #[test]
    fn test_error_message_from_body() {
        let err = CommercialProtocol.error_from_response(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#,
        );
        assert_eq!(err, StreamError::api_call_failed(401, "Incorrect API key provided"));
    }

    #[test]
    fn test_error_falls_back_to_status_text() {
        let err =
            CommercialProtocol.error_from_response(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert_eq!(err.to_string(), "Bad Gateway");
        assert_eq!(err.code(), "API_CALL_FAILED");

        let err = CommercialProtocol.error_from_response(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"message":""}}"#,
        );
        assert_eq!(err.to_string(), "Too Many Requests");
    }
}
