//! Groundchat Ingest - Document ingestion pipeline.
//!
//! Uploads flow through a per-format processing strategy (parse, clean,
//! chunk, enrich) and land in the database and the vector index.

pub mod chunker;
pub mod clean;
pub mod documents;
pub mod enrich;
pub mod error;
pub mod pipeline;
pub mod strategies;

pub use chunker::ChunkPolicy;
pub use clean::clean_text;
pub use documents::DocumentManager;
pub use enrich::SummaryEnricher;
pub use error::{IngestError, IngestResult};
pub use pipeline::DocumentPipeline;
pub use strategies::{FormatStrategy, StrategyRegistry};

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use groundchat_core::DocChunk;
    use groundchat_index::{DocumentFilter, IndexError, IndexResult, SearchRequest, VectorIndex};

    /// In-memory [`VectorIndex`] recording calls, optionally failing writes.
    #[derive(Default)]
    pub struct StubIndex {
        added: Mutex<Vec<DocChunk>>,
        deleted: Mutex<Vec<DocumentFilter>>,
        fail_add: bool,
    }

    impl StubIndex {
        pub fn failing() -> Self {
            Self {
                fail_add: true,
                ..Self::default()
            }
        }

        pub fn added(&self) -> Vec<DocChunk> {
            self.added.lock().unwrap().clone()
        }

        pub fn deleted(&self) -> Vec<DocumentFilter> {
            self.deleted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VectorIndex for StubIndex {
        async fn add(&self, chunks: Vec<DocChunk>) -> IndexResult<()> {
            if self.fail_add {
                return Err(IndexError::InvalidFilter("write refused".to_string()));
            }
            self.added.lock().unwrap().extend(chunks);
            Ok(())
        }

        async fn search(&self, _query: &str, _request: &SearchRequest) -> IndexResult<Vec<DocChunk>> {
            Ok(Vec::new())
        }

        async fn delete(&self, filter: &DocumentFilter) -> IndexResult<()> {
            self.deleted.lock().unwrap().push(filter.clone());
            Ok(())
        }
    }
}
