//! Frame decoders for streaming response bodies
//!
//! A decoder receives the body as decoded text, one transport chunk at a time,
//! and yields `StreamFrame`s. Two framings are supported:
//!
//! - `SseFrameDecoder`: server-sent events, one `data: <json>` line per frame
//! - `JsonChunkDecoder`: one JSON object per chunk; a chunk carrying several
//!   objects, newline-delimited or back to back, yields one frame per object
//!
//! Both hold back a trailing fragment only while its JSON is merely truncated,
//! so a frame split across transport chunks is joined instead of dropped.

use serde_json::Value;

use crate::types::StreamFrame;

/// JSON pointer to the delta text in an OpenAI-style SSE payload
pub const SSE_DELTA_POINTER: &str = "/choices/0/delta/content";

/// JSON pointer to the delta text in an Ollama-style chat chunk
pub const CHAT_CHUNK_DELTA_POINTER: &str = "/message/content";

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// Turns decoded body text into frames
pub trait FrameDecoder: Send {
    /// Feed the next piece of body text
    fn push(&mut self, text: &str) -> Vec<StreamFrame>;

    /// Flush whatever is held back at end of stream
    fn finish(&mut self) -> Vec<StreamFrame>;
}

/// Incremental UTF-8 decoder
///
/// Holds an incomplete multi-byte sequence at the end of a chunk until the
/// rest arrives. Invalid sequences become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk of bytes
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(std::str::from_utf8(&self.pending[..valid]).unwrap_or_default());
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                        None => {
                            self.pending.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush a trailing incomplete sequence lossily
    pub fn finish(&mut self) -> String {
        let out = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        out
    }
}

/// Read the string at `pointer`, treating a missing or non-string value as empty
fn extract_delta(value: &Value, pointer: &str) -> String {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

enum Parsed {
    Complete(Value),
    Truncated,
    Invalid(String),
}

fn parse_json(text: &str) -> Parsed {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Parsed::Complete(value),
        Err(e) if e.is_eof() => Parsed::Truncated,
        Err(e) => Parsed::Invalid(e.to_string()),
    }
}

/// Decoder for `text/event-stream` bodies
#[derive(Debug)]
pub struct SseFrameDecoder {
    buffer: String,
    delta_pointer: String,
}

impl Default for SseFrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SseFrameDecoder {
    /// Decoder reading deltas from `choices[0].delta.content`
    pub fn new() -> Self {
        Self::with_delta_pointer(SSE_DELTA_POINTER)
    }

    /// Decoder reading deltas from a custom JSON pointer
    pub fn with_delta_pointer(pointer: impl Into<String>) -> Self {
        Self {
            buffer: String::new(),
            delta_pointer: pointer.into(),
        }
    }

    /// Decode one complete line. Lines without the `data: ` prefix carry no frame.
    fn decode_line(&self, line: &str) -> Option<StreamFrame> {
        let line = line.trim_end_matches('\r');
        let payload = line.strip_prefix(DATA_PREFIX)?;

        if payload == DONE_SENTINEL {
            return Some(StreamFrame::Done);
        }

        match serde_json::from_str::<Value>(payload) {
            Ok(value) => Some(StreamFrame::delta(extract_delta(&value, &self.delta_pointer))),
            Err(e) => Some(StreamFrame::malformed(payload, e.to_string())),
        }
    }

    /// Whether an unterminated line could still grow into a valid frame
    fn is_incomplete(line: &str) -> bool {
        let line = line.trim_end_matches('\r');
        match line.strip_prefix(DATA_PREFIX) {
            Some(payload) => {
                DONE_SENTINEL.starts_with(payload)
                    || matches!(parse_json(payload), Parsed::Truncated)
            }
            None => DATA_PREFIX.starts_with(line),
        }
    }
}

impl FrameDecoder for SseFrameDecoder {
    fn push(&mut self, text: &str) -> Vec<StreamFrame> {
        self.buffer.push_str(text);
        let mut frames = Vec::new();

        while let Some(pos) = self.buffer.find('\n') {
            if let Some(frame) = self.decode_line(&self.buffer[..pos]) {
                frames.push(frame);
            }
            self.buffer.drain(..=pos);
        }

        if !self.buffer.is_empty() && !Self::is_incomplete(&self.buffer) {
            let tail = std::mem::take(&mut self.buffer);
            frames.extend(self.decode_line(&tail));
        }

        frames
    }

    fn finish(&mut self) -> Vec<StreamFrame> {
        let tail = std::mem::take(&mut self.buffer);
        self.decode_line(&tail).into_iter().collect()
    }
}

/// Decoder for bodies carrying one JSON object per chunk
#[derive(Debug)]
pub struct JsonChunkDecoder {
    buffer: String,
    delta_pointer: String,
}

impl Default for JsonChunkDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonChunkDecoder {
    /// Decoder reading deltas from `message.content`
    pub fn new() -> Self {
        Self::with_delta_pointer(CHAT_CHUNK_DELTA_POINTER)
    }

    /// Decoder reading deltas from a custom JSON pointer
    pub fn with_delta_pointer(pointer: impl Into<String>) -> Self {
        Self {
            buffer: String::new(),
            delta_pointer: pointer.into(),
        }
    }

    fn decode_object(&self, text: &str) -> StreamFrame {
        match parse_json(text) {
            Parsed::Complete(value) => {
                StreamFrame::delta(extract_delta(&value, &self.delta_pointer))
            }
            Parsed::Truncated => StreamFrame::malformed(text, "unexpected end of JSON input"),
            Parsed::Invalid(reason) => StreamFrame::malformed(text, reason),
        }
    }
}

impl FrameDecoder for JsonChunkDecoder {
    fn push(&mut self, text: &str) -> Vec<StreamFrame> {
        self.buffer.push_str(text);
        let mut frames = Vec::new();
        let mut consumed = 0;

        while consumed < self.buffer.len() {
            let rest = &self.buffer[consumed..];
            if rest.trim().is_empty() {
                consumed = self.buffer.len();
                break;
            }

            let mut values = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
            match values.next() {
                Some(Ok(value)) => {
                    frames.push(StreamFrame::delta(extract_delta(&value, &self.delta_pointer)));
                    consumed += values.byte_offset();
                }
                // Truncated object: hold it for the next chunk
                Some(Err(e)) if e.is_eof() => break,
                Some(Err(e)) => {
                    // Skip to the next line so one bad object does not poison the rest
                    let end = rest.find('\n').map_or(rest.len(), |i| i + 1);
                    frames.push(StreamFrame::malformed(rest[..end].trim(), e.to_string()));
                    consumed += end;
                }
                None => {
                    consumed = self.buffer.len();
                    break;
                }
            }
        }

        self.buffer.drain(..consumed);
        frames
    }

    fn finish(&mut self) -> Vec<StreamFrame> {
        let tail = std::mem::take(&mut self.buffer);
        let tail = tail.trim();
        if tail.is_empty() {
            Vec::new()
        } else {
            vec![self.decode_object(tail)]
        }
    }
}
