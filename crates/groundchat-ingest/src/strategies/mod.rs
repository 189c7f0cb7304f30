//! Per-format document processing strategies.
//!
//! Each strategy owns the full processing chain for one family of file
//! formats: parse, clean, chunk, and metadata enrichment. Only `parse`
//! differs between formats; the later stages share default implementations.

mod json;
mod office;
mod pdf;
mod text;

pub use json::JsonStrategy;
pub use office::OfficeStrategy;
pub use pdf::PdfStrategy;
pub use text::TextStrategy;

use std::sync::Arc;

use groundchat_core::{DocChunk, FileResource};
use serde_json::{Map, Value};

use crate::chunker::ChunkPolicy;
use crate::clean::clean_text;
use crate::error::{IngestError, IngestResult};

pub trait FormatStrategy: Send + Sync {
    /// Strategy name for logging.
    fn name(&self) -> &'static str;

    /// Whether this strategy handles the given file.
    fn can_process(&self, resource: &FileResource) -> bool;

    /// Extracts text from the raw bytes, one chunk per natural section of
    /// the format (page, slide, paragraph). Format-specific metadata such
    /// as page numbers is attached here.
    fn parse(&self, resource: &FileResource) -> IngestResult<Vec<DocChunk>>;

    /// Normalizes the text of every chunk.
    fn clean(&self, chunks: Vec<DocChunk>) -> Vec<DocChunk> {
        chunks
            .into_iter()
            .map(|mut chunk| {
                chunk.text = clean_text(&chunk.text);
                chunk
            })
            .filter(|chunk| !chunk.text.is_empty())
            .collect()
    }

    /// Re-splits cleaned chunks against the token budget. Source metadata
    /// is carried onto every piece.
    fn chunk(&self, chunks: Vec<DocChunk>, chunk_size: usize, chunk_overlap: usize) -> Vec<DocChunk> {
        let policy = ChunkPolicy::new(chunk_size, chunk_overlap);
        let mut out = Vec::new();
        for source in chunks {
            for piece in policy.split(&source.text) {
                out.push(DocChunk {
                    text: piece,
                    metadata: source.metadata.clone(),
                    score: None,
                });
            }
            if out.len() >= policy.max_num_chunks {
                out.truncate(policy.max_num_chunks);
                break;
            }
        }
        out
    }

    /// Merges document-level metadata into every chunk, overwriting on key
    /// collision.
    fn enrich_metadata(&self, chunks: Vec<DocChunk>, extra: &Map<String, Value>) -> Vec<DocChunk> {
        chunks
            .into_iter()
            .map(|mut chunk| {
                chunk.merge_metadata(extra);
                chunk
            })
            .collect()
    }
}

/// Ordered collection of strategies. Selection walks the list and returns
/// the first strategy that claims the file.
pub struct StrategyRegistry {
    strategies: Vec<Arc<dyn FormatStrategy>>,
}

impl StrategyRegistry {
    /// Registry with the built-in strategies: PDF, Office, plain text, JSON.
    pub fn with_defaults() -> Self {
        Self {
            strategies: vec![
                Arc::new(PdfStrategy),
                Arc::new(OfficeStrategy),
                Arc::new(TextStrategy),
                Arc::new(JsonStrategy),
            ],
        }
    }

    pub fn empty() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Adds a strategy ahead of the built-ins so it wins selection for any
    /// format it claims.
    pub fn register(&mut self, strategy: Arc<dyn FormatStrategy>) {
        self.strategies.insert(0, strategy);
    }

    pub fn select(&self, resource: &FileResource) -> IngestResult<Arc<dyn FormatStrategy>> {
        self.strategies
            .iter()
            .find(|s| s.can_process(resource))
            .cloned()
            .ok_or_else(|| IngestError::UnsupportedFormat {
                filename: resource.filename.clone(),
            })
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
