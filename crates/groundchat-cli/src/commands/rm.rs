//! Rm command - delete documents and their indexed content.

use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use groundchat_index::SqliteVectorIndex;
use groundchat_ingest::DocumentManager;
use groundchat_ollama::OllamaClient;
use tokio::runtime::Runtime;

use super::{get_config, get_database, resolve_ids};

pub fn run(user: &str, prefixes: &[String]) -> Result<()> {
    if prefixes.is_empty() {
        anyhow::bail!("No document ids given.");
    }

    let db = get_database()?;
    let config = get_config()?;
    let ids = resolve_ids(&db, user, prefixes)?;

    let client = OllamaClient::from_config(&config.ollama)
        .context("Failed to create Ollama client")?;
    let index = Arc::new(SqliteVectorIndex::new(
        db.clone(),
        client,
        &config.ollama.embedding_model,
    ));
    let manager = DocumentManager::new(db, index);

    let rt = Runtime::new().context("Failed to create async runtime")?;
    rt.block_on(manager.delete(user, &ids))
        .context("Failed to delete documents")?;

    println!("{} Deleted {} document(s).", "✓".green(), ids.len());
    Ok(())
}
