//! Streaming frame types

/// One decoded unit of a streaming response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// Text delta carried by a frame (may be empty)
    Delta {
        text: String,
    },
    /// End-of-stream sentinel (`data: [DONE]`); carries no content
    Done,
    /// Frame that could not be parsed; skipped by the pipeline
    Malformed {
        raw: String,
        reason: String,
    },
}

impl StreamFrame {
    /// Create a delta frame
    pub fn delta(text: impl Into<String>) -> Self {
        StreamFrame::Delta { text: text.into() }
    }

    /// Create a malformed frame
    pub fn malformed(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        StreamFrame::Malformed {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    /// Get the delta text if this is a delta frame
    pub fn as_delta(&self) -> Option<&str> {
        match self {
            StreamFrame::Delta { text } => Some(text),
            _ => None,
        }
    }

    /// Check if this is the end-of-stream sentinel
    pub fn is_done(&self) -> bool {
        matches!(self, StreamFrame::Done)
    }

    /// Check if this frame failed to parse
    pub fn is_malformed(&self) -> bool {
        matches!(self, StreamFrame::Malformed { .. })
    }
}
