//! File-based configuration provider (YAML)
//!
//! Supports user-level (~/.config/chatwire/config.yaml) and workspace-level
//! (.chatwire/config.yaml) config.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::settings::DispatchSettings;
use super::traits::{ConfigProvider, ConfigResult};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Request settings
    #[serde(default)]
    pub dispatch: DispatchSettings,

    /// Id of the model selected by default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

/// Config level (user or workspace)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLevel {
    /// User-level config (~/.config/chatwire/config.yaml)
    User,
    /// Workspace-level config (.chatwire/config.yaml in workspace root)
    Workspace,
}

impl ConfigLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigLevel::User => "user",
            ConfigLevel::Workspace => "workspace",
        }
    }
}

/// File-based configuration provider
///
/// Reads and writes configuration from YAML files. A missing file reads
/// as defaults; the file is created on first write.
///
/// # Example
///
/// ```no_run
/// use chatwire_core::config::FileConfigProvider;
///
/// // User-level config
/// let user_config = FileConfigProvider::user();
///
/// // Workspace-level config
/// let workspace_config = FileConfigProvider::workspace("/path/to/workspace");
/// ```
pub struct FileConfigProvider {
    path: PathBuf,
    level: ConfigLevel,
    cache: RwLock<Option<ConfigFile>>,
}

impl FileConfigProvider {
    /// Create a new file config provider for a specific path
    pub fn new(path: impl Into<PathBuf>, level: ConfigLevel) -> Self {
        Self {
            path: path.into(),
            level,
            cache: RwLock::new(None),
        }
    }

    /// Create a user-level config provider (~/.config/chatwire/config.yaml)
    pub fn user() -> Self {
        let config_dir = dirs::config_dir().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        });
        Self::new(config_dir.join("chatwire").join("config.yaml"), ConfigLevel::User)
    }

    /// Create a workspace-level config provider (.chatwire/config.yaml)
    pub fn workspace(workspace_root: impl AsRef<Path>) -> Self {
        let path = workspace_root.as_ref().join(".chatwire").join("config.yaml");
        Self::new(path, ConfigLevel::Workspace)
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the config level
    pub fn level(&self) -> ConfigLevel {
        self.level
    }

    /// Check if the config file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&self) -> ConfigResult<ConfigFile> {
        if !self.path.exists() {
            return Ok(ConfigFile::default());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ConfigFile::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    fn save(&self, config: &ConfigFile) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_yaml::to_string(config)?)?;
        *self.cache.write() = Some(config.clone());
        Ok(())
    }

    /// Get cached or load config
    pub fn config(&self) -> ConfigResult<ConfigFile> {
        if let Some(config) = self.cache.read().as_ref() {
            return Ok(config.clone());
        }
        self.reload()
    }

    /// Reload config from disk (invalidate cache)
    pub fn reload(&self) -> ConfigResult<ConfigFile> {
        let config = self.load()?;
        *self.cache.write() = Some(config.clone());
        Ok(config)
    }

    /// Id of the default model, if one is set
    pub fn default_model(&self) -> ConfigResult<Option<String>> {
        Ok(self.config()?.default_model)
    }

    /// Set or clear the default model id
    pub fn set_default_model(&self, model_id: Option<String>) -> ConfigResult<()> {
        let mut config = self.config()?;
        config.default_model = model_id;
        self.save(&config)
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .field("level", &self.level)
            .field("exists", &self.exists())
            .finish()
    }
}

#[async_trait]
impl ConfigProvider for FileConfigProvider {
    async fn settings(&self) -> ConfigResult<DispatchSettings> {
        Ok(self.config()?.dispatch)
    }

    async fn update_settings(&self, settings: DispatchSettings) -> ConfigResult<()> {
        let mut config = self.config()?;
        config.dispatch = settings;
        self.save(&config)
    }
}
