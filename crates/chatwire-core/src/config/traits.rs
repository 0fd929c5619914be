//! Configuration provider trait

use async_trait::async_trait;

use super::settings::DispatchSettings;

/// Configuration provider abstraction
///
/// Implementations:
/// - `MemoryConfigProvider`: In-memory for testing
/// - `FileConfigProvider`: YAML file (~/.config/chatwire/config.yaml)
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Current dispatch settings
    async fn settings(&self) -> ConfigResult<DispatchSettings>;

    /// Replace the dispatch settings
    async fn update_settings(&self, settings: DispatchSettings) -> ConfigResult<()>;
}

/// Errors that can occur during configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Other(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
