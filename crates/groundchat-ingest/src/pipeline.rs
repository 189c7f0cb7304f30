//! The document ingestion pipeline.
//!
//! Upload processing runs the selected strategy's stages in a fixed order:
//! parse, clean, chunk, enrich, then persist. The document record is written
//! before the vector index; if the index write fails the record is removed
//! so a failed upload leaves nothing behind.

use std::sync::Arc;

use groundchat_config::RagConfig;
use groundchat_core::{meta, DocumentRecord, FileResource};
use groundchat_db::Database;
use groundchat_index::VectorIndex;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::enrich::SummaryEnricher;
use crate::error::{IngestError, IngestResult};
use crate::strategies::StrategyRegistry;

pub struct DocumentPipeline {
    registry: StrategyRegistry,
    db: Database,
    index: Arc<dyn VectorIndex>,
    summarizer: Option<SummaryEnricher>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl DocumentPipeline {
    pub fn new(db: Database, index: Arc<dyn VectorIndex>, rag: &RagConfig) -> Self {
        Self {
            registry: StrategyRegistry::with_defaults(),
            db,
            index,
            summarizer: None,
            chunk_size: rag.chunk_size,
            chunk_overlap: rag.chunk_overlap,
        }
    }

    pub fn with_summarizer(mut self, summarizer: SummaryEnricher) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Extension point for format strategies beyond the built-ins.
    pub fn registry_mut(&mut self) -> &mut StrategyRegistry {
        &mut self.registry
    }

    /// Ingest an uploaded file for `user_id`, returning the stored record.
    pub async fn ingest(
        &self,
        resource: FileResource,
        user_id: &str,
    ) -> IngestResult<DocumentRecord> {
        let strategy = self.registry.select(&resource)?;
        info!(
            filename = %resource.filename,
            strategy = strategy.name(),
            "Ingesting document for user {user_id}"
        );

        let mut record = DocumentRecord::new(user_id, &resource.filename)
            .with_file_size(resource.bytes.len() as i64);
        if let Some(content_type) = &resource.content_type {
            record = record.with_content_type(content_type.clone());
        }

        // Parsing and chunking are CPU-bound; keep them off the runtime threads.
        let chunk_size = self.chunk_size;
        let chunk_overlap = self.chunk_overlap;
        let stage = Arc::clone(&strategy);
        let chunks = tokio::task::spawn_blocking(move || {
            let parsed = stage.parse(&resource)?;
            debug!("Parsed {} section(s)", parsed.len());
            let cleaned = stage.clean(parsed);
            Ok::<_, IngestError>(stage.chunk(cleaned, chunk_size, chunk_overlap))
        })
        .await
        .map_err(|e| IngestError::Internal(e.to_string()))??;

        let mut extra = Map::new();
        extra.insert(meta::DOCUMENT_ID.into(), Value::from(record.id.clone()));
        extra.insert(meta::USER_ID.into(), Value::from(user_id));
        extra.insert(meta::FILE_NAME.into(), Value::from(record.filename.clone()));
        let mut chunks = strategy.enrich_metadata(chunks, &extra);

        if let Some(summarizer) = &self.summarizer {
            chunks = summarizer.apply(chunks).await;
        }
        info!("Prepared {} chunk(s) from {}", chunks.len(), record.filename);

        // Record first, vectors second. A failed vector write rolls the
        // record back.
        self.db.create_document(&record)?;
        if let Err(err) = self.index.add(chunks).await {
            warn!(
                document_id = %record.id,
                "Vector write failed ({err}), removing document record"
            );
            self.db.remove_document(&record.id)?;
            return Err(err.into());
        }

        Ok(record)
    }
}
