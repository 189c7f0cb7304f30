//! Retrieval orchestration: expand, search, pool, dedupe, rerank.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use groundchat_core::DocChunk;
use groundchat_index::{DocumentFilter, SearchRequest, VectorIndex};
use tracing::{debug, warn};

use crate::augment::AugmentedContext;
use crate::error::RagResult;
use crate::expand::QueryExpansion;

pub struct RetrievalOrchestrator {
    index: Arc<dyn VectorIndex>,
    expander: Arc<dyn QueryExpansion>,
    top_k: usize,
    similarity_threshold: f32,
}

impl RetrievalOrchestrator {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        expander: Arc<dyn QueryExpansion>,
        top_k: usize,
        similarity_threshold: f32,
    ) -> Self {
        Self {
            index,
            expander,
            top_k,
            similarity_threshold,
        }
    }

    /// Retrieve context for `query` from the given documents. An empty
    /// document set returns an empty context without touching the expander
    /// or the index. Phrasings are searched concurrently; a phrasing whose
    /// search fails contributes nothing rather than failing the whole
    /// retrieval.
    pub async fn retrieve(
        &self,
        query: &str,
        document_ids: Vec<String>,
    ) -> RagResult<AugmentedContext> {
        let filter = DocumentFilter::new(document_ids);
        if filter.is_empty() {
            return Ok(AugmentedContext::empty());
        }

        let phrasings = self.expander.expand(query).await;
        let request = SearchRequest {
            top_k: self.top_k,
            similarity_threshold: self.similarity_threshold,
            filter,
        };

        let searches = phrasings
            .iter()
            .map(|phrasing| self.index.search(phrasing, &request));

        let mut pooled = Vec::new();
        for (phrasing, result) in phrasings.iter().zip(join_all(searches).await) {
            match result {
                Ok(chunks) => pooled.extend(chunks),
                Err(err) => warn!("Search failed for phrasing {phrasing:?}: {err}"),
            }
        }
        debug!("Pooled {} chunk(s) from {} phrasing(s)", pooled.len(), phrasings.len());

        Ok(AugmentedContext::new(dedup_rerank(pooled)))
    }
}

/// Collapse duplicate chunks (same text) keeping the highest score seen,
/// then order by score descending. Ties keep first-seen order.
pub fn dedup_rerank(chunks: Vec<DocChunk>) -> Vec<DocChunk> {
    let mut unique: Vec<DocChunk> = Vec::new();
    let mut by_text: HashMap<String, usize> = HashMap::new();

    for chunk in chunks {
        match by_text.get(&chunk.text) {
            Some(&idx) => {
                if chunk.score.unwrap_or(0.0) > unique[idx].score.unwrap_or(0.0) {
                    unique[idx] = chunk;
                }
            }
            None => {
                by_text.insert(chunk.text.clone(), unique.len());
                unique.push(chunk);
            }
        }
    }

    unique.sort_by(|a, b| {
        b.score
            .unwrap_or(0.0)
            .partial_cmp(&a.score.unwrap_or(0.0))
            .unwrap_or(Ordering::Equal)
    });
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use groundchat_index::{IndexError, IndexResult};
    use std::sync::Mutex;

    struct FixedExpander(Vec<String>);

    #[async_trait]
    impl QueryExpansion for FixedExpander {
        async fn expand(&self, _query: &str) -> Vec<String> {
            self.0.clone()
        }
    }

    /// Index returning canned results per query, recording searches.
    #[derive(Default)]
    struct CannedIndex {
        results: HashMap<String, Vec<DocChunk>>,
        failing: Vec<String>,
        searched: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl VectorIndex for CannedIndex {
        async fn add(&self, _chunks: Vec<DocChunk>) -> IndexResult<()> {
            Ok(())
        }

        async fn search(&self, query: &str, _request: &SearchRequest) -> IndexResult<Vec<DocChunk>> {
            self.searched.lock().unwrap().push(query.to_string());
            if self.failing.iter().any(|q| q == query) {
                return Err(IndexError::InvalidFilter("boom".to_string()));
            }
            Ok(self.results.get(query).cloned().unwrap_or_default())
        }

        async fn delete(&self, _filter: &DocumentFilter) -> IndexResult<()> {
            Ok(())
        }
    }

    fn chunk(text: &str, score: f32) -> DocChunk {
        DocChunk::new(text).with_score(score)
    }

    fn orchestrator(index: CannedIndex, phrasings: &[&str]) -> RetrievalOrchestrator {
        RetrievalOrchestrator::new(
            Arc::new(index),
            Arc::new(FixedExpander(
                phrasings.iter().map(|s| s.to_string()).collect(),
            )),
            5,
            0.5,
        )
    }

    #[tokio::test]
    async fn empty_document_set_short_circuits() {
        let index = CannedIndex::default();
        let orch = orchestrator(index, &["q"]);
        let out = orch.retrieve("q", Vec::new()).await.unwrap();
        assert!(out.format().is_none());
        let out = out.into_chunks();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn searches_every_phrasing_and_pools() {
        let mut index = CannedIndex::default();
        index.results.insert("q".into(), vec![chunk("alpha", 0.9)]);
        index.results.insert("q2".into(), vec![chunk("beta", 0.8)]);
        index.results.insert("q3".into(), vec![chunk("gamma", 0.7)]);

        let orch = orchestrator(index, &["q", "q2", "q3"]);
        let out = orch.retrieve("q", vec!["d1".into()]).await.unwrap().into_chunks();

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].text, "alpha");
        assert_eq!(out[2].text, "gamma");
    }

    #[tokio::test]
    async fn duplicate_chunks_keep_the_best_score() {
        let mut index = CannedIndex::default();
        index
            .results
            .insert("q".into(), vec![chunk("same", 0.6), chunk("other", 0.9)]);
        index.results.insert("q2".into(), vec![chunk("same", 0.8)]);

        let orch = orchestrator(index, &["q", "q2"]);
        let out = orch.retrieve("q", vec!["d1".into()]).await.unwrap().into_chunks();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "other");
        assert_eq!(out[1].text, "same");
        assert_eq!(out[1].score, Some(0.8));
    }

    #[tokio::test]
    async fn failed_phrasing_contributes_nothing() {
        let mut index = CannedIndex::default();
        index.results.insert("q".into(), vec![chunk("kept", 0.9)]);
        index.failing.push("q2".into());

        let orch = orchestrator(index, &["q", "q2"]);
        let out = orch.retrieve("q", vec!["d1".into()]).await.unwrap().into_chunks();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "kept");
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let out = dedup_rerank(vec![chunk("first", 0.5), chunk("second", 0.5)]);
        assert_eq!(out[0].text, "first");
        assert_eq!(out[1].text, "second");
    }
}
