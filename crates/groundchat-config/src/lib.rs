//! Groundchat Config - Configuration structures, loading, and platform paths.

mod config;
mod error;
mod paths;

pub use config::{ChatConfig, Config, GeneralConfig, OllamaConfig, RagConfig};
pub use error::{ConfigError, ConfigResult};
pub use paths::AppPaths;
