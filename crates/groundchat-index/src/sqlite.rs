//! SQLite-backed vector index.
//!
//! Embeds chunk text through Ollama and stores vectors in the groundchat
//! database. Search embeds the query once and runs a filtered cosine scan.

use crate::error::IndexResult;
use crate::filter::DocumentFilter;
use crate::{SearchRequest, VectorIndex};
use async_trait::async_trait;
use groundchat_core::DocChunk;
use groundchat_db::{Database, EmbeddedChunk};
use groundchat_ollama::OllamaClient;
use tracing::{debug, info};

pub struct SqliteVectorIndex {
    db: Database,
    client: OllamaClient,
    embedding_model: String,
}

impl SqliteVectorIndex {
    pub fn new(db: Database, client: OllamaClient, embedding_model: impl Into<String>) -> Self {
        Self {
            db,
            client,
            embedding_model: embedding_model.into(),
        }
    }
}

#[async_trait]
impl VectorIndex for SqliteVectorIndex {
    async fn add(&self, chunks: Vec<DocChunk>) -> IndexResult<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        debug!("Embedding {} chunks", chunks.len());
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self
            .client
            .embed_batch(&self.embedding_model, &texts)
            .await?;

        let embedded: Vec<EmbeddedChunk> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| EmbeddedChunk::new(chunk, vector, self.embedding_model.clone()))
            .collect();

        self.db.insert_chunks(&embedded)?;
        info!("Stored {} embedded chunks", embedded.len());
        Ok(())
    }

    async fn search(&self, query: &str, request: &SearchRequest) -> IndexResult<Vec<DocChunk>> {
        if request.filter.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.client.embed(&self.embedding_model, query).await?;
        let hits = self.db.search_chunks(
            &query_vector,
            request.top_k,
            request.similarity_threshold,
            request.filter.ids(),
        )?;
        debug!("Search for {:?} returned {} chunks", query, hits.len());
        Ok(hits)
    }

    async fn delete(&self, filter: &DocumentFilter) -> IndexResult<()> {
        if filter.is_empty() {
            return Ok(());
        }

        let removed = self.db.delete_chunks_by_documents(filter.ids())?;
        info!("Removed {} chunks matching {}", removed, filter);
        Ok(())
    }
}
