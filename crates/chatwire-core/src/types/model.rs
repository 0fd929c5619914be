//! Model descriptor types

use serde::{Deserialize, Serialize};

/// Backend category of a model
///
/// Selects the wire protocol and the authentication requirements. Unknown
/// category strings are preserved as `Other` so they survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModelCategory {
    /// API-key-authenticated, OpenAI-style SSE endpoint
    Commercial,
    /// Unauthenticated local endpoint (Ollama-style chat API)
    Local,
    /// Any unrecognized category string
    Other(String),
}

impl ModelCategory {
    pub fn as_str(&self) -> &str {
        match self {
            ModelCategory::Commercial => "commercial",
            ModelCategory::Local => "local",
            ModelCategory::Other(s) => s,
        }
    }

    /// Whether this category routes to the commercial protocol
    pub fn is_commercial(&self) -> bool {
        matches!(self, ModelCategory::Commercial)
    }
}

impl From<String> for ModelCategory {
    fn from(s: String) -> Self {
        match s.as_str() {
            "commercial" => ModelCategory::Commercial,
            "local" => ModelCategory::Local,
            _ => ModelCategory::Other(s),
        }
    }
}

impl From<&str> for ModelCategory {
    fn from(s: &str) -> Self {
        ModelCategory::from(s.to_string())
    }
}

impl From<ModelCategory> for String {
    fn from(category: ModelCategory) -> Self {
        match category {
            ModelCategory::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ModelCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured chat model the dispatcher can target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiModel {
    /// Unique identifier for this model entry
    pub id: String,
    /// Display name; also sent as the model name to local backends
    pub name: String,
    /// Backend category
    #[serde(rename = "type")]
    pub category: ModelCategory,
    /// Base endpoint URL, e.g. `https://api.x.ai/v1` or `http://localhost:11434`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    /// Static bearer credential for commercial backends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Whether this model is the selected one
    #[serde(default)]
    pub is_active: bool,
}

impl AiModel {
    /// Create a new model descriptor
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<ModelCategory>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            api_endpoint: None,
            api_key: None,
            is_active: false,
        }
    }

    /// Create a commercial model with endpoint and credential
    pub fn commercial(
        id: impl Into<String>,
        name: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self::new(id, name, ModelCategory::Commercial)
            .with_endpoint(endpoint)
            .with_api_key(api_key)
    }

    /// Create a local model with an endpoint
    pub fn local(
        id: impl Into<String>,
        name: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self::new(id, name, ModelCategory::Local).with_endpoint(endpoint)
    }

    /// Set the endpoint URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = Some(endpoint.into());
        self
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Mark the model as active
    pub fn active(mut self) -> Self {
        self.is_active = true;
        self
    }

    /// Endpoint with surrounding whitespace and trailing slashes removed,
    /// or `None` when unset or blank
    pub fn endpoint(&self) -> Option<&str> {
        self.api_endpoint
            .as_deref()
            .map(|e| e.trim().trim_end_matches('/'))
            .filter(|e| !e.is_empty())
    }

    /// API key, or `None` when unset or blank
    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parsing() {
        assert_eq!(ModelCategory::from("commercial"), ModelCategory::Commercial);
        assert_eq!(ModelCategory::from("local"), ModelCategory::Local);
        assert_eq!(
            ModelCategory::from("Commercial"),
            ModelCategory::Other("Commercial".to_string())
        );
        assert!(!ModelCategory::from("cloud").is_commercial());
    }

    #[test]
    fn test_model_serialization_uses_persisted_names() {
        let model = AiModel::commercial("grok", "Grok", "https://api.x.ai/v1", "xai-key").active();
        let json = serde_json::to_value(&model).unwrap();

        assert_eq!(json["type"], "commercial");
        assert_eq!(json["apiEndpoint"], "https://api.x.ai/v1");
        assert_eq!(json["apiKey"], "xai-key");
        assert_eq!(json["isActive"], true);
    }

    #[test]
    fn test_unknown_category_round_trips() {
        let json = r#"{"id":"m1","name":"llama3","type":"edge","isActive":false}"#;
        let model: AiModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.category, ModelCategory::Other("edge".to_string()));
        assert!(model.api_endpoint.is_none());

        let back = serde_json::to_value(&model).unwrap();
        assert_eq!(back["type"], "edge");
    }

    #[test]
    fn test_endpoint_normalization() {
        let model = AiModel::local("m", "llama3", "http://localhost:11434/");
        assert_eq!(model.endpoint(), Some("http://localhost:11434"));

        let blank = AiModel::local("m", "llama3", "   ");
        assert_eq!(blank.endpoint(), None);

        let no_key = AiModel::new("m", "grok", "commercial").with_api_key("");
        assert_eq!(no_key.credential(), None);
    }
}
