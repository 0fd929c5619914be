//! Shared HTTP streaming pipeline
//!
//! Every backend runs the same loop: send the request, classify a non-2xx
//! reply, then read the body chunk by chunk, decode frames with the
//! protocol's `FrameDecoder`, and accumulate deltas while reporting progress.
//! Both the wait for response headers and each wait for the next chunk race
//! against the cancellation token.

use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::{Response, StatusCode};
use serde::Serialize;

use crate::config::DispatchSettings;
use crate::logging::{Logger, SharedLogger};
use crate::types::{AiModel, CancellationToken, ChatMessage, StreamFrame};
use crate::{log_debug, log_error, log_info, log_warn};

use super::decoder::{FrameDecoder, Utf8ChunkDecoder};
use super::error::{StreamError, StreamResult};
use super::traits::{ChatBackend, ChatResponse, ProgressFn, WireProtocol};

/// `{role, content}` pair as sent on the wire
#[derive(Debug, Serialize)]
pub(crate) struct WireMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

/// Human-readable status text, e.g. `Unauthorized`
pub(crate) fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}

/// Build the HTTP client used by all backends
///
/// Only a connect timeout is applied; a whole-request timeout would cut off
/// long-running streams.
pub fn build_http_client(settings: &DispatchSettings) -> StreamResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs));
    if let Some(agent) = &settings.user_agent {
        builder = builder.user_agent(agent.clone());
    }
    Ok(builder.build()?)
}

/// A response that cannot carry a streamed body
fn has_no_body(response: &Response) -> bool {
    matches!(response.status(), StatusCode::NO_CONTENT | StatusCode::RESET_CONTENT)
        || response.content_length() == Some(0)
}

/// Running state of one call
struct Accumulator<'a> {
    content: String,
    deltas: usize,
    on_progress: Option<ProgressFn<'a>>,
}

impl<'a> Accumulator<'a> {
    fn new(on_progress: Option<ProgressFn<'a>>) -> Self {
        Self {
            content: String::new(),
            deltas: 0,
            on_progress,
        }
    }

    fn apply(&mut self, frame: StreamFrame, logger: &dyn Logger, source: &str) {
        match frame {
            StreamFrame::Delta { text } => {
                self.content.push_str(&text);
                self.deltas += 1;
                if let Some(callback) = self.on_progress.as_deref_mut() {
                    callback(&self.content);
                }
            }
            StreamFrame::Done => {
                log_debug!(logger, "[{}] Received [DONE] sentinel", source);
            }
            StreamFrame::Malformed { raw, reason } => {
                log_warn!(logger, "[{}] Failed to parse chunk: {} ({})", source, raw, reason);
            }
        }
    }
}

/// Read a byte stream to completion, decoding and accumulating frames
///
/// Returns the accumulated content, with `Canceled` when `cancel` fires and
/// `Unclassified` when the body stream yields an error.
pub async fn read_stream<S, B, E>(
    body: S,
    mut decoder: Box<dyn FrameDecoder>,
    cancel: &CancellationToken,
    on_progress: Option<ProgressFn<'_>>,
    logger: &dyn Logger,
    source: &str,
) -> ChatResponse
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    futures::pin_mut!(body);
    let mut utf8 = Utf8ChunkDecoder::new();
    let mut acc = Accumulator::new(on_progress);

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            next = body.next() => Some(next),
        };

        let chunk = match next {
            None => {
                log_info!(logger, "[{}] Stream cancelled after {} deltas", source, acc.deltas);
                return ChatResponse::failed(acc.content, StreamError::Canceled);
            }
            Some(None) => break,
            Some(Some(Err(e))) => {
                log_error!(logger, "[{}] Stream error: {}", source, e);
                return ChatResponse::failed(acc.content, StreamError::Unclassified(e.to_string()));
            }
            Some(Some(Ok(bytes))) => bytes,
        };

        let text = utf8.push(chunk.as_ref());
        for frame in decoder.push(&text) {
            if cancel.is_cancelled() {
                break;
            }
            acc.apply(frame, logger, source);
        }
    }

    let tail = utf8.finish();
    let mut frames = decoder.push(&tail);
    frames.extend(decoder.finish());
    for frame in frames {
        acc.apply(frame, logger, source);
    }

    log_debug!(
        logger,
        "[{}] Stream completed: {} deltas, {} chars",
        source,
        acc.deltas,
        acc.content.len()
    );
    ChatResponse::completed(acc.content)
}

/// Backend speaking one `WireProtocol` over HTTP
pub struct HttpBackend<P: WireProtocol> {
    protocol: P,
    client: reqwest::Client,
    settings: DispatchSettings,
    logger: SharedLogger,
}

impl<P: WireProtocol> HttpBackend<P> {
    /// Create a backend sharing an existing HTTP client
    pub fn new(
        protocol: P,
        client: reqwest::Client,
        settings: DispatchSettings,
        logger: SharedLogger,
    ) -> Self {
        Self {
            protocol,
            client,
            settings,
            logger,
        }
    }

    /// The wire protocol this backend speaks
    pub fn protocol(&self) -> &P {
        &self.protocol
    }

    /// Settings the requests are built from
    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    async fn open(
        &self,
        model: &AiModel,
        messages: &[ChatMessage],
        cancel: &CancellationToken,
    ) -> StreamResult<Response> {
        let request = self
            .protocol
            .build_request(&self.client, model, messages, &self.settings)?;

        log_info!(
            self.logger,
            "[{}] POST {}{} (model={}, {} messages)",
            self.protocol.name(),
            model.endpoint().unwrap_or_default(),
            self.protocol.path(),
            model.name,
            messages.len()
        );

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StreamError::Canceled),
            result = request.send() => result?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(StreamError::Canceled),
                body = response.text() => body.unwrap_or_default(),
            };
            return Err(self.protocol.error_from_response(status, &body));
        }

        if has_no_body(&response) {
            return Err(StreamError::ResponseBodyNull);
        }

        Ok(response)
    }
}

#[async_trait]
impl<P: WireProtocol> ChatBackend for HttpBackend<P> {
    fn name(&self) -> &str {
        self.protocol.name()
    }

    async fn stream_chat(
        &self,
        model: &AiModel,
        messages: &[ChatMessage],
        cancel: &CancellationToken,
        on_progress: Option<ProgressFn<'_>>,
    ) -> ChatResponse {
        if cancel.is_cancelled() {
            return ChatResponse::failed("", StreamError::Canceled);
        }

        let response = match self.open(model, messages, cancel).await {
            Ok(response) => response,
            Err(err) => {
                if err.is_canceled() {
                    log_info!(
                        self.logger,
                        "[{}] Request cancelled before streaming",
                        self.protocol.name()
                    );
                } else {
                    log_error!(self.logger, "[{}] {}: {}", self.protocol.name(), err.code(), err);
                }
                return ChatResponse::failed("", err);
            }
        };

        read_stream(
            response.bytes_stream(),
            self.protocol.decoder(),
            cancel,
            on_progress,
            &*self.logger,
            self.protocol.name(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, MemoryLogger, NoOpLogger};
    use crate::providers::decoder::{JsonChunkDecoder, SseFrameDecoder};
    use futures::stream;

    fn chunks(parts: &[&str]) -> impl Stream<Item = Result<Vec<u8>, std::io::Error>> {
        let owned: Vec<Result<Vec<u8>, std::io::Error>> =
            parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect();
        stream::iter(owned)
    }

    fn sse(content: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({"choices": [{"delta": {"content": content}}]})
        )
    }

    #[tokio::test]
    async fn test_sse_accumulates_with_cumulative_progress() {
        let body = [sse("Hel"), sse("lo"), sse(", world"), "data: [DONE]\n\n".to_string()];
        let parts: Vec<&str> = body.iter().map(String::as_str).collect();

        let mut seen = Vec::new();
        let mut on_progress = |content: &str| seen.push(content.to_string());
        let resp = read_stream(
            chunks(&parts),
            Box::new(SseFrameDecoder::new()),
            &CancellationToken::new(),
            Some(&mut on_progress),
            &NoOpLogger,
            "test",
        )
        .await;

        assert!(resp.is_ok());
        assert_eq!(resp.content, "Hello, world");
        assert_eq!(seen, vec!["Hel", "Hello", "Hello, world"]);
    }

    #[tokio::test]
    async fn test_malformed_frame_is_logged_and_skipped() {
        let body = format!("{}data: {{broken\n{}", sse("A"), sse("B"));
        let logger = MemoryLogger::new();

        let mut calls = 0;
        let mut on_progress = |_: &str| calls += 1;
        let resp = read_stream(
            chunks(&[&body]),
            Box::new(SseFrameDecoder::new()),
            &CancellationToken::new(),
            Some(&mut on_progress),
            &logger,
            "commercial",
        )
        .await;

        assert_eq!(resp.content, "AB");
        assert!(resp.is_ok());
        assert_eq!(calls, 2);
        assert!(logger.contains(LogLevel::Warn, "Failed to parse chunk: {broken"));
    }

    #[tokio::test]
    async fn test_json_chunks_accumulate() {
        let mut seen = Vec::new();
        let mut on_progress = |content: &str| seen.push(content.to_string());
        let resp = read_stream(
            chunks(&[r#"{"message":{"content":"A"}}"#, r#"{"message":{"content":"B"}}"#]),
            Box::new(JsonChunkDecoder::new()),
            &CancellationToken::new(),
            Some(&mut on_progress),
            &NoOpLogger,
            "local",
        )
        .await;

        assert_eq!(resp, ChatResponse::completed("AB"));
        assert_eq!(seen, vec!["A", "AB"]);
    }

    #[tokio::test]
    async fn test_body_error_keeps_partial_content() {
        let items: Vec<Result<Vec<u8>, String>> = vec![
            Ok(sse("partial").into_bytes()),
            Err("connection reset".to_string()),
        ];
        let resp = read_stream(
            stream::iter(items),
            Box::new(SseFrameDecoder::new()),
            &CancellationToken::new(),
            None,
            &NoOpLogger,
            "test",
        )
        .await;

        assert_eq!(resp.content, "partial");
        assert_eq!(resp.error, Some(StreamError::Unclassified("connection reset".into())));
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_for_next_chunk() {
        let first = sse("partial ");
        let body = chunks(&[&first]).chain(stream::pending());
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        let mut on_progress = move |_: &str| trigger.cancel();
        let resp = tokio::time::timeout(
            Duration::from_secs(2),
            read_stream(
                body,
                Box::new(SseFrameDecoder::new()),
                &cancel,
                Some(&mut on_progress),
                &NoOpLogger,
                "test",
            ),
        )
        .await
        .expect("cancelled stream must resolve");

        assert_eq!(resp.content, "partial ");
        assert!(resp.is_canceled());
        assert_eq!(resp.error_message().as_deref(), Some("CANCELED"));
    }

    #[tokio::test]
    async fn test_cancel_stops_remaining_frames_in_chunk() {
        let body = format!("{}{}", sse("one"), sse("two"));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        let mut on_progress = move |_: &str| trigger.cancel();
        let resp = read_stream(
            chunks(&[&body]),
            Box::new(SseFrameDecoder::new()),
            &cancel,
            Some(&mut on_progress),
            &NoOpLogger,
            "test",
        )
        .await;

        assert_eq!(resp, ChatResponse::failed("one", StreamError::Canceled));
    }

    #[tokio::test]
    async fn test_utf8_split_across_chunks() {
        let line = sse("日本");
        let bytes = line.as_bytes();
        let split = line.find("日").unwrap() + 1;
        let items: Vec<Result<Vec<u8>, std::io::Error>> =
            vec![Ok(bytes[..split].to_vec()), Ok(bytes[split..].to_vec())];

        let resp = read_stream(
            stream::iter(items),
            Box::new(SseFrameDecoder::new()),
            &CancellationToken::new(),
            None,
            &NoOpLogger,
            "test",
        )
        .await;

        assert_eq!(resp.content, "日本");
    }

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(StatusCode::UNAUTHORIZED), "Unauthorized");
        assert_eq!(status_text(StatusCode::from_u16(599).unwrap()), "599");
    }

    #[test]
    fn test_build_http_client() {
        let settings = DispatchSettings::default().with_user_agent("chatwire-test");
        assert!(build_http_client(&settings).is_ok());
    }
}
