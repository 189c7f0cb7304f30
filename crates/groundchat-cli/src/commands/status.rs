//! Status command - server and database health.

use super::{get_config, get_database, get_paths};
use anyhow::{Context, Result};
use colored::Colorize;
use groundchat_ollama::OllamaClient;
use tokio::runtime::Runtime;

pub fn run() -> Result<()> {
    let paths = get_paths()?;

    println!("{}", "Groundchat Status".cyan().bold());
    println!("{}", "─".repeat(50));

    if !paths.is_initialized() {
        println!("  {} Not initialized. Run 'groundchat init'.", "✗".red());
        return Ok(());
    }

    let _db = get_database()?;
    println!("  {} Database: {}", "✓".green(), paths.database_file.display());

    let config = get_config()?;
    let client = OllamaClient::from_config(&config.ollama)
        .context("Failed to create Ollama client")?;

    let rt = Runtime::new().context("Failed to create async runtime")?;
    if rt.block_on(client.is_available()) {
        println!("  {} Ollama: {}", "✓".green(), config.ollama.host);
        println!("    chat model:      {}", config.ollama.model);
        println!("    embedding model: {}", config.ollama.embedding_model);
    } else {
        println!(
            "  {} Ollama is not running at {}. Start it with 'ollama serve'.",
            "✗".red(),
            config.ollama.host
        );
    }

    Ok(())
}
