//! Upload command - ingest a document.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use groundchat_core::FileResource;
use groundchat_index::SqliteVectorIndex;
use groundchat_ingest::{DocumentPipeline, SummaryEnricher};
use groundchat_ollama::OllamaClient;
use tokio::runtime::Runtime;
use tracing::debug;

use super::{format_size, get_config, get_database};

pub fn run(path: &Path, user: &str, no_summary: bool) -> Result<()> {
    let db = get_database()?;
    let config = get_config()?;

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("Invalid file name")?
        .to_string();
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let resource = FileResource::new(&filename, bytes);
    debug!("Read {} bytes from {}", resource.bytes.len(), path.display());

    let client = OllamaClient::from_config(&config.ollama)
        .context("Failed to create Ollama client")?;
    let rt = Runtime::new().context("Failed to create async runtime")?;

    if !rt.block_on(client.is_available()) {
        anyhow::bail!(
            "Ollama is not running at {}. Start it with 'ollama serve'.",
            config.ollama.host
        );
    }

    let index = Arc::new(SqliteVectorIndex::new(
        db.clone(),
        client.clone(),
        &config.ollama.embedding_model,
    ));
    let mut pipeline = DocumentPipeline::new(db.clone(), index, &config.rag);
    if config.rag.generate_summary && !no_summary {
        pipeline = pipeline
            .with_summarizer(SummaryEnricher::new(client.clone(), &config.ollama.model));
    }

    println!(
        "{} {} ({})",
        "Uploading".cyan().bold(),
        filename,
        format_size(resource.bytes.len() as i64)
    );

    let record = rt
        .block_on(pipeline.ingest(resource, user))
        .context("Failed to ingest document")?;

    let chunks = db.chunk_count(&record.id)?;
    println!(
        "{} Stored document {} with {} chunk(s).",
        "✓".green(),
        record.id.cyan(),
        chunks
    );
    println!("  It is part of the chat's retrieval set. Use 'groundchat toggle --off' to exclude it.");

    Ok(())
}
