//! Configuration provider abstractions
//!
//! Supports multiple configuration sources:
//! - `MemoryConfigProvider`: In-memory for testing
//! - `FileConfigProvider`: YAML file-based (user/workspace level)

mod settings;
mod traits;
mod memory;
mod file;

pub use settings::{
    DispatchSettings, DEFAULT_COMMERCIAL_MODEL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TEMPERATURE,
};
pub use traits::{ConfigProvider, ConfigError, ConfigResult};
pub use memory::MemoryConfigProvider;
pub use file::{FileConfigProvider, ConfigFile, ConfigLevel};
