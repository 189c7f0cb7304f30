//! Groundchat Index - The vector index seam.
//!
//! Chat and ingestion talk to the index only through the [`VectorIndex`]
//! trait, so the bundled SQLite-backed implementation can be swapped for a
//! remote vector store without touching either pipeline.

mod error;
mod filter;
mod sqlite;

pub use error::{IndexError, IndexResult};
pub use filter::DocumentFilter;
pub use sqlite::SqliteVectorIndex;

use async_trait::async_trait;
use groundchat_core::DocChunk;

/// Parameters for a similarity query.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Maximum number of chunks returned.
    pub top_k: usize,
    /// Minimum cosine similarity for a chunk to be returned.
    pub similarity_threshold: f32,
    /// Restricts the search to the filtered documents.
    pub filter: DocumentFilter,
}

/// A store of embedded chunks answering similarity queries.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Embed and store a batch of chunks.
    async fn add(&self, chunks: Vec<DocChunk>) -> IndexResult<()>;

    /// Return the chunks most similar to `query`, scores set, sorted
    /// descending, restricted by the request's filter.
    async fn search(&self, query: &str, request: &SearchRequest) -> IndexResult<Vec<DocChunk>>;

    /// Remove every chunk matching the filter.
    async fn delete(&self, filter: &DocumentFilter) -> IndexResult<()>;
}
