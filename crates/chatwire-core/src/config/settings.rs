//! Dispatch settings

use serde::{Deserialize, Serialize};

/// Default model literal sent to commercial endpoints
pub const DEFAULT_COMMERCIAL_MODEL: &str = "grok-beta";

/// Default sampling temperature for commercial requests
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Default TCP connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Settings that shape outgoing requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    /// Model name sent in commercial request bodies
    pub commercial_model: String,
    /// Sampling temperature sent in commercial request bodies
    pub temperature: f64,
    /// Connect timeout for the HTTP client
    pub connect_timeout_secs: u64,
    /// Custom User-Agent header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            commercial_model: DEFAULT_COMMERCIAL_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl DispatchSettings {
    /// Set the commercial model literal
    pub fn with_commercial_model(mut self, model: impl Into<String>) -> Self {
        self.commercial_model = model.into();
        self
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Set the User-Agent header
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = DispatchSettings::default();
        assert_eq!(settings.commercial_model, "grok-beta");
        assert_eq!(settings.temperature, 0.7);
        assert_eq!(settings.connect_timeout_secs, 10);
        assert!(settings.user_agent.is_none());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let settings: DispatchSettings = serde_yaml::from_str("temperature: 0.2\n").unwrap();
        assert_eq!(settings.temperature, 0.2);
        assert_eq!(settings.commercial_model, "grok-beta");
    }
}
