//! Conversation message types

use serde::{Deserialize, Serialize};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery status of an assistant message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Streaming,
    Completed,
    Failed,
}

/// One turn in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Unique message identifier
    pub id: String,
    /// Text content
    pub content: String,
    /// Who produced the message
    pub role: MessageRole,
    /// Creation time in milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Id of the model this message belongs to
    pub model_id: String,
    /// Delivery status, only present on assistant turns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
}

impl ChatMessage {
    fn with_role(
        role: MessageRole,
        id: impl Into<String>,
        model_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            role,
            timestamp: now_millis(),
            model_id: model_id.into(),
            status: None,
        }
    }

    /// Create a user message
    pub fn user(
        id: impl Into<String>,
        model_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::with_role(MessageRole::User, id, model_id, content)
    }

    /// Create a completed assistant message
    pub fn assistant(
        id: impl Into<String>,
        model_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let mut msg = Self::with_role(MessageRole::Assistant, id, model_id, content);
        msg.status = Some(MessageStatus::Completed);
        msg
    }

    /// Create a system message
    pub fn system(
        id: impl Into<String>,
        model_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::with_role(MessageRole::System, id, model_id, content)
    }

    /// Set the timestamp
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set the delivery status
    pub fn with_status(mut self, status: MessageStatus) -> Self {
        self.status = Some(status);
        self
    }
}

fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_creation() {
        let user = ChatMessage::user("1", "grok", "Hello");
        assert_eq!(user.role, MessageRole::User);
        assert_eq!(user.status, None);
        assert!(user.timestamp > 0);

        let asst = ChatMessage::assistant("2", "grok", "Hi there!");
        assert_eq!(asst.role, MessageRole::Assistant);
        assert_eq!(asst.status, Some(MessageStatus::Completed));
    }

    #[test]
    fn test_message_serialization() {
        let msg = ChatMessage::assistant("2", "grok", "Hi")
            .with_timestamp(1_700_000_000_000)
            .with_status(MessageStatus::Streaming);
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["role"], "assistant");
        assert_eq!(json["modelId"], "grok");
        assert_eq!(json["status"], "streaming");
        assert_eq!(json["timestamp"], 1_700_000_000_000i64);

        let user = serde_json::to_string(&ChatMessage::user("1", "grok", "Hello")).unwrap();
        assert!(!user.contains("status"));
    }
}
