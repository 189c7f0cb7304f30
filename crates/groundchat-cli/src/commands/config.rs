//! Configuration commands.

use super::get_paths;
use anyhow::{Context, Result};
use colored::Colorize;
use groundchat_config::Config;

pub fn show() -> Result<()> {
    let paths = get_paths()?;

    if !paths.config_file.exists() {
        anyhow::bail!("Config file not found. Run 'groundchat init' first.");
    }

    let contents =
        std::fs::read_to_string(&paths.config_file).context("Failed to read config file")?;

    println!("{}", "Current Configuration".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("{}", contents);

    Ok(())
}

pub fn path() -> Result<()> {
    let paths = get_paths()?;
    println!("{}", paths.config_file.display());
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let paths = get_paths()?;

    let mut config = Config::load_from(&paths.config_file).context("Failed to load config")?;

    let parts: Vec<&str> = key.split('.').collect();
    match parts.as_slice() {
        ["ollama", "host"] => config.ollama.host = value.to_string(),
        ["ollama", "model"] => config.ollama.model = value.to_string(),
        ["ollama", "embedding_model"] => config.ollama.embedding_model = value.to_string(),
        ["ollama", "timeout_seconds"] => {
            config.ollama.timeout_seconds = value.parse().context("Invalid timeout value")?;
        }
        ["rag", "chunk_size"] => {
            config.rag.chunk_size = value.parse().context("Invalid chunk size")?;
        }
        ["rag", "chunk_overlap"] => {
            config.rag.chunk_overlap = value.parse().context("Invalid chunk overlap")?;
        }
        ["rag", "top_k"] => {
            config.rag.top_k = value.parse().context("Invalid top_k value")?;
        }
        ["rag", "similarity_threshold"] => {
            config.rag.similarity_threshold =
                value.parse().context("Invalid similarity threshold")?;
        }
        ["rag", "expansion_queries"] => {
            config.rag.expansion_queries = value.parse().context("Invalid expansion count")?;
        }
        ["rag", "generate_summary"] => {
            config.rag.generate_summary = value.parse().context("Invalid boolean value")?;
        }
        ["chat", "temperature"] => {
            config.chat.temperature = value.parse().context("Invalid temperature")?;
        }
        ["chat", "max_tokens"] => {
            config.chat.max_tokens = value.parse().context("Invalid max_tokens value")?;
        }
        ["chat", "top_p"] => {
            config.chat.top_p = value.parse().context("Invalid top_p value")?;
        }
        ["chat", "top_k"] => {
            config.chat.top_k = value.parse().context("Invalid top_k value")?;
        }
        ["chat", "memory_window"] => {
            config.chat.memory_window = value.parse().context("Invalid memory window")?;
        }
        _ => anyhow::bail!("Unknown configuration key: {}", key),
    }

    config
        .save_to(&paths.config_file)
        .context("Failed to save config")?;

    println!("{} Set {} = {}", "✓".green(), key.cyan(), value);
    Ok(())
}
