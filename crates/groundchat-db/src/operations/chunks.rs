//! Chunk and embedding storage with brute-force cosine search.
//!
//! Backs the bundled vector index. Search scans every embedding whose
//! chunk belongs to one of the requested documents, which is adequate
//! for per-user document sets.

use crate::database::Database;
use crate::error::{DbError, DbResult};
use groundchat_core::{meta, DocChunk};
use rusqlite::params;

/// A chunk paired with its embedding, ready for storage.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub id: String,
    pub chunk: DocChunk,
    pub vector: Vec<f32>,
    pub model: String,
}

impl EmbeddedChunk {
    pub fn new(chunk: DocChunk, vector: Vec<f32>, model: impl Into<String>) -> Self {
        Self {
            id: groundchat_core::new_id(),
            chunk,
            vector,
            model: model.into(),
        }
    }
}

/// Calculate cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot_product = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for i in 0..a.len() {
        dot_product += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 {
        return 0.0;
    }

    dot_product / denominator
}

fn vector_to_blob(vector: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(vector.len() * 4);
    for v in vector {
        blob.extend_from_slice(&v.to_le_bytes());
    }
    blob
}

fn blob_to_vector(blob: &[u8], dimensions: usize) -> Vec<f32> {
    blob.chunks(4)
        .take(dimensions)
        .map(|bytes| {
            if bytes.len() == 4 {
                f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
            } else {
                0.0
            }
        })
        .collect()
}

impl Database {
    /// Store a batch of embedded chunks.
    pub fn insert_chunks(&self, chunks: &[EmbeddedChunk]) -> DbResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        for embedded in chunks {
            let document_id = embedded
                .chunk
                .meta_str(meta::DOCUMENT_ID)
                .ok_or_else(|| DbError::Other("chunk is missing document_id metadata".into()))?;

            tx.execute(
                "INSERT INTO chunks (id, document_id, text, metadata) VALUES (?1, ?2, ?3, ?4)",
                params![
                    embedded.id,
                    document_id,
                    embedded.chunk.text,
                    serde_json::Value::Object(embedded.chunk.metadata.clone()).to_string(),
                ],
            )?;

            tx.execute(
                "INSERT INTO embeddings (chunk_id, vector, model, dimensions) VALUES (?1, ?2, ?3, ?4)",
                params![
                    embedded.id,
                    vector_to_blob(&embedded.vector),
                    embedded.model,
                    embedded.vector.len() as i64,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Find chunks similar to `query_vector` within the given documents.
    ///
    /// Results carry their similarity score and are sorted descending,
    /// truncated to `top_k`. An empty `document_ids` slice matches nothing.
    pub fn search_chunks(
        &self,
        query_vector: &[f32],
        top_k: usize,
        min_similarity: f32,
        document_ids: &[String],
    ) -> DbResult<Vec<DocChunk>> {
        if document_ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn()?;
        let placeholders = (1..=document_ids.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r#"
            SELECT c.text, c.metadata, e.vector, e.dimensions
            FROM embeddings e
            JOIN chunks c ON c.id = e.chunk_id
            WHERE c.document_id IN ({placeholders})
            "#,
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(document_ids.iter()), |row| {
            let text: String = row.get(0)?;
            let metadata_str: String = row.get(1)?;
            let vector_bytes: Vec<u8> = row.get(2)?;
            let dimensions: i64 = row.get(3)?;
            Ok((text, metadata_str, vector_bytes, dimensions))
        })?;

        let mut results: Vec<DocChunk> = Vec::new();
        for row_result in rows {
            let (text, metadata_str, vector_bytes, dimensions) = row_result?;
            let vector = blob_to_vector(&vector_bytes, dimensions as usize);
            let similarity = cosine_similarity(query_vector, &vector);
            if similarity < min_similarity {
                continue;
            }

            let metadata = serde_json::from_str::<serde_json::Value>(&metadata_str)
                .ok()
                .and_then(|v| v.as_object().cloned())
                .unwrap_or_default();

            results.push(DocChunk {
                text,
                metadata,
                score: Some(similarity),
            });
        }

        results.sort_by(|a, b| {
            b.score
                .unwrap_or(0.0)
                .partial_cmp(&a.score.unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        Ok(results)
    }

    /// Delete every chunk (and embedding, via cascade) belonging to the
    /// given documents. Returns the number of chunks removed.
    pub fn delete_chunks_by_documents(&self, document_ids: &[String]) -> DbResult<usize> {
        if document_ids.is_empty() {
            return Ok(0);
        }

        let conn = self.conn()?;
        let placeholders = (1..=document_ids.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let removed = conn.execute(
            &format!("DELETE FROM chunks WHERE document_id IN ({placeholders})"),
            rusqlite::params_from_iter(document_ids.iter()),
        )?;
        Ok(removed)
    }

    /// Number of indexed chunks for a document.
    pub fn chunk_count(&self, document_id: &str) -> DbResult<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE document_id = ?1",
            params![document_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(doc_id: &str, text: &str) -> DocChunk {
        DocChunk::new(text).with_meta(meta::DOCUMENT_ID, doc_id)
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_insert_and_search_filters_by_document() {
        let db = Database::open_in_memory().unwrap();
        db.insert_chunks(&[
            EmbeddedChunk::new(chunk("d1", "alpha"), vec![1.0, 0.0], "test"),
            EmbeddedChunk::new(chunk("d2", "beta"), vec![1.0, 0.0], "test"),
        ])
        .unwrap();

        let hits = db
            .search_chunks(&[1.0, 0.0], 10, 0.5, &["d1".to_string()])
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "alpha");
        assert!(hits[0].score.unwrap() > 0.99);
    }

    #[test]
    fn test_search_respects_threshold_and_top_k() {
        let db = Database::open_in_memory().unwrap();
        db.insert_chunks(&[
            EmbeddedChunk::new(chunk("d1", "close"), vec![1.0, 0.1], "test"),
            EmbeddedChunk::new(chunk("d1", "closer"), vec![1.0, 0.0], "test"),
            EmbeddedChunk::new(chunk("d1", "orthogonal"), vec![0.0, 1.0], "test"),
        ])
        .unwrap();

        let hits = db
            .search_chunks(&[1.0, 0.0], 1, 0.5, &["d1".to_string()])
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "closer");
    }

    #[test]
    fn test_search_with_empty_filter_matches_nothing() {
        let db = Database::open_in_memory().unwrap();
        db.insert_chunks(&[EmbeddedChunk::new(
            chunk("d1", "alpha"),
            vec![1.0, 0.0],
            "test",
        )])
        .unwrap();

        let hits = db.search_chunks(&[1.0, 0.0], 10, 0.0, &[]).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_delete_by_document() {
        let db = Database::open_in_memory().unwrap();
        db.insert_chunks(&[
            EmbeddedChunk::new(chunk("d1", "alpha"), vec![1.0], "test"),
            EmbeddedChunk::new(chunk("d1", "beta"), vec![1.0], "test"),
            EmbeddedChunk::new(chunk("d2", "gamma"), vec![1.0], "test"),
        ])
        .unwrap();

        let removed = db
            .delete_chunks_by_documents(&["d1".to_string()])
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(db.chunk_count("d1").unwrap(), 0);
        assert_eq!(db.chunk_count("d2").unwrap(), 1);
    }
}
