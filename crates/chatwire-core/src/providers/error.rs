//! Stream error types

use thiserror::Error;

/// Classified failure of a streaming chat call
///
/// `Display` is the user-facing message; `code()` is the stable tag.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// Commercial endpoint returned a non-2xx status
    #[error("{message}")]
    ApiCallFailed { status: u16, message: String },

    /// Local endpoint returned a non-2xx status
    #[error("{message}")]
    LocalApiCallFailed { status: u16, message: String },

    /// Transport returned no streamable body
    #[error("Response body is null")]
    ResponseBodyNull,

    /// Caller aborted the stream
    #[error("CANCELED")]
    Canceled,

    /// Model has no usable endpoint URL
    #[error("No API endpoint configured for model {model}")]
    MissingEndpoint { model: String },

    /// Commercial model has no credential
    #[error("API key is required for model {model}")]
    MissingApiKey { model: String },

    /// Anything else: network failures, body read errors
    #[error("{0}")]
    Unclassified(String),
}

impl StreamError {
    /// Create a commercial API error
    pub fn api_call_failed(status: u16, message: impl Into<String>) -> Self {
        Self::ApiCallFailed {
            status,
            message: message.into(),
        }
    }

    /// Create a local API error
    pub fn local_api_call_failed(status: u16, message: impl Into<String>) -> Self {
        Self::LocalApiCallFailed {
            status,
            message: message.into(),
        }
    }

    /// Create a missing endpoint error
    pub fn missing_endpoint(model: impl Into<String>) -> Self {
        Self::MissingEndpoint { model: model.into() }
    }

    /// Create a missing API key error
    pub fn missing_api_key(model: impl Into<String>) -> Self {
        Self::MissingApiKey { model: model.into() }
    }

    /// Stable classification tag
    pub fn code(&self) -> &'static str {
        match self {
            StreamError::ApiCallFailed { .. } => "API_CALL_FAILED",
            StreamError::LocalApiCallFailed { .. } => "LOCAL_API_CALL_FAILED",
            StreamError::ResponseBodyNull => "RESPONSE_BODY_NULL",
            StreamError::Canceled => "CANCELED",
            StreamError::MissingEndpoint { .. } => "MISSING_ENDPOINT",
            StreamError::MissingApiKey { .. } => "MISSING_API_KEY",
            StreamError::Unclassified(_) => "UNCLASSIFIED",
        }
    }

    /// HTTP status for API failures
    pub fn status(&self) -> Option<u16> {
        match self {
            StreamError::ApiCallFailed { status, .. }
            | StreamError::LocalApiCallFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if the caller aborted the stream
    pub fn is_canceled(&self) -> bool {
        matches!(self, StreamError::Canceled)
    }
}

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        StreamError::Unclassified(err.to_string())
    }
}

pub type StreamResult<T> = Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(StreamError::api_call_failed(401, "bad key").code(), "API_CALL_FAILED");
        assert_eq!(
            StreamError::local_api_call_failed(404, "model not found").code(),
            "LOCAL_API_CALL_FAILED"
        );
        assert_eq!(StreamError::ResponseBodyNull.code(), "RESPONSE_BODY_NULL");
        assert_eq!(StreamError::Canceled.code(), "CANCELED");
        assert_eq!(StreamError::Unclassified("boom".into()).code(), "UNCLASSIFIED");
    }

    #[test]
    fn test_display_is_user_message() {
        assert_eq!(
            StreamError::api_call_failed(401, "Incorrect API key").to_string(),
            "Incorrect API key"
        );
        assert_eq!(StreamError::Canceled.to_string(), "CANCELED");
        assert_eq!(StreamError::ResponseBodyNull.to_string(), "Response body is null");
        assert_eq!(
            StreamError::missing_api_key("grok").to_string(),
            "API key is required for model grok"
        );
    }

    #[test]
    fn test_status() {
        assert_eq!(StreamError::local_api_call_failed(500, "x").status(), Some(500));
        assert_eq!(StreamError::Canceled.status(), None);
        assert!(StreamError::Canceled.is_canceled());
    }
}
