//! Hybrid document retrieval
//!
//! Produces the candidate set of document chunks for a query by combining
//! the primary semantic search with an optional keyword/full-text leg.

use crate::stores::ChunkSearchStore;
use crate::types::{RagQueryOptions, RagResult, SearchResult};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Placeholder similarity for chunks found only by keyword search:
/// relevant but not quantified by vector similarity.
pub const DEFAULT_KEYWORD_SCORE: f32 = 0.6;

/// Hybrid retriever over the chunk search store
pub struct HybridRetriever {
    store: Arc<dyn ChunkSearchStore>,
}

impl HybridRetriever {
    pub fn new(store: Arc<dyn ChunkSearchStore>) -> Self {
        Self { store }
    }

    /// Retrieve candidate chunks for a query.
    ///
    /// The semantic leg requests `2 * max_results` rows to leave room for
    /// later filtering; its failure aborts the retrieval. The keyword leg
    /// runs only when hybrid search is enabled and at least one term was
    /// extracted, and its failure is logged and skipped — semantic-only
    /// results are used instead.
    pub async fn retrieve(
        &self,
        query_embedding: &[f32],
        keywords: &[String],
        options: &RagQueryOptions,
        document_ids: Option<&[String]>,
    ) -> RagResult<Vec<SearchResult>> {
        let semantic_results = self
            .store
            .semantic_search(
                query_embedding,
                options.min_similarity_threshold,
                options.max_results * 2,
                document_ids,
            )
            .await?;

        debug!(
            "Semantic search returned {} chunks (threshold: {})",
            semantic_results.len(),
            options.min_similarity_threshold
        );

        let mut combined = semantic_results;

        if options.use_hybrid_search && !keywords.is_empty() {
            match self
                .store
                .keyword_search(keywords, options.max_results, document_ids)
                .await
            {
                Ok(keyword_chunks) => {
                    let existing_ids: HashSet<String> =
                        combined.iter().map(|r| r.chunk.id.clone()).collect();

                    let mut appended = 0;
                    for chunk in keyword_chunks {
                        if !existing_ids.contains(&chunk.id) {
                            combined.push(SearchResult {
                                chunk,
                                similarity: DEFAULT_KEYWORD_SCORE,
                            });
                            appended += 1;
                        }
                    }

                    debug!("Keyword search appended {} additional chunks", appended);
                }
                Err(e) => {
                    warn!("Keyword search failed, using semantic results only: {}", e);
                }
            }
        }

        Ok(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChunkMetadata, DocumentChunk, RagError};
    use async_trait::async_trait;

    fn chunk(id: &str, content: &str) -> DocumentChunk {
        DocumentChunk {
            id: id.to_string(),
            document_id: None,
            content: content.to_string(),
            chunk_index: 0,
            metadata: ChunkMetadata::default(),
        }
    }

    struct FakeStore {
        semantic: RagResult<Vec<SearchResult>>,
        keyword: RagResult<Vec<DocumentChunk>>,
    }

    #[async_trait]
    impl ChunkSearchStore for FakeStore {
        async fn semantic_search(
            &self,
            _query_embedding: &[f32],
            _threshold: f32,
            _count: usize,
            _document_ids: Option<&[String]>,
        ) -> RagResult<Vec<SearchResult>> {
            match &self.semantic {
                Ok(results) => Ok(results.clone()),
                Err(_) => Err(RagError::Search("semantic search failed".to_string())),
            }
        }

        async fn keyword_search(
            &self,
            _terms: &[String],
            _limit: usize,
            _document_ids: Option<&[String]>,
        ) -> RagResult<Vec<DocumentChunk>> {
            match &self.keyword {
                Ok(chunks) => Ok(chunks.clone()),
                Err(_) => Err(RagError::Search("keyword search failed".to_string())),
            }
        }
    }

    fn options() -> RagQueryOptions {
        RagQueryOptions::default()
    }

    #[tokio::test]
    async fn test_merge_keeps_all_semantic_and_new_keyword_chunks() {
        let store = FakeStore {
            semantic: Ok(vec![
                SearchResult {
                    chunk: chunk("a", "alpha"),
                    similarity: 0.9,
                },
                SearchResult {
                    chunk: chunk("b", "beta"),
                    similarity: 0.8,
                },
            ]),
            keyword: Ok(vec![chunk("b", "beta"), chunk("c", "gamma")]),
        };

        let retriever = HybridRetriever::new(Arc::new(store));
        let results = retriever
            .retrieve(&[1.0, 0.0], &["beta".to_string()], &options(), None)
            .await
            .unwrap();

        let ids: Vec<&str> = results.iter().map(|r| r.chunk.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        // Keyword-only hit carries the placeholder score
        let gamma = results.iter().find(|r| r.chunk.id == "c").unwrap();
        assert_eq!(gamma.similarity, DEFAULT_KEYWORD_SCORE);
        // Already-present chunk keeps its semantic score
        let beta = results.iter().find(|r| r.chunk.id == "b").unwrap();
        assert_eq!(beta.similarity, 0.8);
    }

    #[tokio::test]
    async fn test_semantic_failure_is_fatal() {
        let store = FakeStore {
            semantic: Err(RagError::Search("rpc down".to_string())),
            keyword: Ok(vec![chunk("c", "gamma")]),
        };

        let retriever = HybridRetriever::new(Arc::new(store));
        let result = retriever
            .retrieve(&[1.0], &["gamma".to_string()], &options(), None)
            .await;
        assert!(matches!(result, Err(RagError::Search(_))));
    }

    #[tokio::test]
    async fn test_keyword_failure_is_recovered() {
        let store = FakeStore {
            semantic: Ok(vec![SearchResult {
                chunk: chunk("a", "alpha"),
                similarity: 0.9,
            }]),
            keyword: Err(RagError::Search("fts down".to_string())),
        };

        let retriever = HybridRetriever::new(Arc::new(store));
        let results = retriever
            .retrieve(&[1.0], &["alpha".to_string()], &options(), None)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.id, "a");
    }

    #[tokio::test]
    async fn test_keyword_leg_skipped_without_terms() {
        let store = FakeStore {
            semantic: Ok(vec![SearchResult {
                chunk: chunk("a", "alpha"),
                similarity: 0.9,
            }]),
            // Would fail if it were called
            keyword: Err(RagError::Search("must not be called".to_string())),
        };

        let retriever = HybridRetriever::new(Arc::new(store));
        let results = retriever.retrieve(&[1.0], &[], &options(), None).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_keyword_leg_skipped_when_hybrid_disabled() {
        let store = FakeStore {
            semantic: Ok(vec![]),
            keyword: Ok(vec![chunk("c", "gamma")]),
        };

        let mut opts = options();
        opts.use_hybrid_search = false;

        let retriever = HybridRetriever::new(Arc::new(store));
        let results = retriever
            .retrieve(&[1.0], &["gamma".to_string()], &opts, None)
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
