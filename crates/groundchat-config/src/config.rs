//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub rag: RagConfig,

    #[serde(default)]
    pub chat: ChatConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &PathBuf) -> ConfigResult<()> {
        let default_config = Self::default_config_string();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, default_config)?;
        Ok(())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Groundchat Configuration
# Chat with a local model grounded in your documents

[general]
# Data directory for the database
# data_dir = "~/.local/share/groundchat"

[ollama]
# Ollama server address
host = "http://localhost:11434"

# Default model for chat and query expansion
model = "gemma3:12b"

# Model for generating embeddings
embedding_model = "nomic-embed-text"

# Request timeout in seconds
timeout_seconds = 120

[rag]
# Token budget per chunk
chunk_size = 800

# Sliding-window overlap between consecutive chunks (tokens, 0 = disabled)
chunk_overlap = 0

# Top-K chunks retrieved per query phrasing
top_k = 5

# Minimum cosine similarity for a chunk to be considered relevant
similarity_threshold = 0.5

# Number of alternate query phrasings generated before retrieval
expansion_queries = 3

# Attach model-generated document summaries to chunks during ingestion
generate_summary = true

[chat]
# Generation defaults, applied when a request leaves them unspecified
temperature = 0.8
max_tokens = 8196
top_p = 0.90
top_k = 30

# Most recent messages kept as conversational context per session
memory_window = 20
"#
        .to_string()
    }
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub data_dir: Option<String>,
}

/// Ollama server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
    pub embedding_model: String,
    pub timeout_seconds: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "gemma3:12b".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            timeout_seconds: 120,
        }
    }
}

/// Retrieval and ingestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Token budget per chunk.
    pub chunk_size: usize,
    /// Sliding-window overlap between consecutive chunks (tokens, 0 = disabled).
    pub chunk_overlap: usize,
    /// Top-K chunks retrieved per query phrasing.
    pub top_k: usize,
    /// Minimum cosine similarity for a retrieved chunk.
    pub similarity_threshold: f32,
    /// Number of alternate phrasings generated before retrieval.
    pub expansion_queries: usize,
    /// Attach model-generated document summaries during ingestion.
    pub generate_summary: bool,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 0,
            top_k: 5,
            similarity_threshold: 0.5,
            expansion_queries: 3,
            generate_summary: true,
        }
    }
}

/// Chat session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub temperature: f32,
    pub max_tokens: i32,
    pub top_p: f32,
    pub top_k: i32,
    /// Most recent messages kept as conversational context per session.
    pub memory_window: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            max_tokens: 8196,
            top_p: 0.90,
            top_k: 30,
            memory_window: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.rag.chunk_size, 800);
        assert_eq!(config.rag.top_k, 5);
        assert_eq!(config.rag.similarity_threshold, 0.5);
        assert_eq!(config.rag.expansion_queries, 3);
        assert_eq!(config.chat.temperature, 0.8);
        assert_eq!(config.chat.max_tokens, 8196);
        assert_eq!(config.chat.top_p, 0.90);
        assert_eq!(config.chat.top_k, 30);
        assert_eq!(config.chat.memory_window, 20);
    }

    #[test]
    fn test_default_config_string_parses() {
        let config: Config = toml::from_str(&Config::default_config_string()).unwrap();
        assert_eq!(config.ollama.host, "http://localhost:11434");
        assert_eq!(config.rag.chunk_overlap, 0);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str("[rag]\ntop_k = 8\n").unwrap();
        assert_eq!(config.rag.top_k, 8);
        assert_eq!(config.rag.chunk_size, 800);
        assert_eq!(config.chat.memory_window, 20);
    }
}
