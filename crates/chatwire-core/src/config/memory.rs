//! In-memory configuration provider

use async_trait::async_trait;
use parking_lot::RwLock;

use super::settings::DispatchSettings;
use super::traits::{ConfigProvider, ConfigResult};

/// In-memory configuration provider for testing
#[derive(Debug, Default)]
pub struct MemoryConfigProvider {
    settings: RwLock<DispatchSettings>,
}

impl MemoryConfigProvider {
    /// Create a provider holding default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider with initial settings
    pub fn with_settings(settings: DispatchSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }
}

#[async_trait]
impl ConfigProvider for MemoryConfigProvider {
    async fn settings(&self) -> ConfigResult<DispatchSettings> {
        Ok(self.settings.read().clone())
    }

    async fn update_settings(&self, settings: DispatchSettings) -> ConfigResult<()> {
        *self.settings.write() = settings;
        Ok(())
    }
}
