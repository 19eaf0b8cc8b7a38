//! RAG pipeline
//!
//! Orchestrates a single query through classification, embedding
//! acquisition, hybrid retrieval, filtering, reranking, context assembly,
//! answer generation and best-effort persistence. Each invocation is a
//! stateless request: configuration is loaded fresh from the settings
//! store and the collaborator services are consumed as black boxes.

use crate::classifier::{QueryClassifier, QueryType};
use crate::context::{assemble_context, build_prompt, SYSTEM_PROMPT};
use crate::embeddings::{EmbeddingProvider, EmbeddingService};
use crate::keywords::extract_keywords;
use crate::llm_client::GenerationProvider;
use crate::ranking::{apply_metadata_filters, order_by_similarity, rerank_results};
use crate::retriever::HybridRetriever;
use crate::stores::{ChunkSearchStore, EmbeddingCacheStore, MessageStore, SettingsStore};
use crate::token_counter;
use crate::types::{
    merge_model_config, NewChatMessage, RagError, RagRequest, RagResponse, RagResponseMetadata,
    RagResult,
};
use docuchat_core::{log_operation_start, log_operation_success};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Complete RAG pipeline handling retrieval and generation for one query
pub struct RagPipeline {
    settings_store: Arc<dyn SettingsStore>,
    message_store: Arc<dyn MessageStore>,
    classifier: QueryClassifier,
    embedding_service: EmbeddingService,
    retriever: HybridRetriever,
    generation: Arc<dyn GenerationProvider>,
}

impl RagPipeline {
    pub fn new(
        settings_store: Arc<dyn SettingsStore>,
        cache_store: Arc<dyn EmbeddingCacheStore>,
        search_store: Arc<dyn ChunkSearchStore>,
        message_store: Arc<dyn MessageStore>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        generation: Arc<dyn GenerationProvider>,
    ) -> Self {
        Self {
            settings_store,
            message_store,
            classifier: QueryClassifier::new(),
            embedding_service: EmbeddingService::new(embedding_provider, cache_store),
            retriever: HybridRetriever::new(search_store),
            generation,
        }
    }

    /// Process a query end to end and produce an answer with sources.
    ///
    /// Fatal stages: input validation, settings load, embedding
    /// acquisition, semantic search, generation. Recovered stages: cache
    /// reads/writes, the keyword search leg, answer persistence.
    pub async fn process(&self, request: RagRequest) -> RagResult<RagResponse> {
        if request.query.trim().is_empty() {
            return Err(RagError::Validation("Query must not be empty".to_string()));
        }

        log_operation_start!("rag_query");
        let start_time = Instant::now();

        let query = request.query.as_str();
        debug!("Processing query: {}", query);

        // Step 1: Load the persisted configuration for this request
        let settings = self.settings_store.load_settings().await?;
        let options = settings.options.merged_with(request.options.as_ref());
        let llm_config = merge_model_config(&settings.llm, request.model_config.as_ref());

        // Step 2: Classify the question
        let query_type = if options.use_query_classification {
            self.classifier.classify(query)
        } else {
            QueryType::General
        };
        debug!("Query classified as {}", query_type);

        // Step 3: Obtain the query embedding (cache-first)
        let query_embedding = self
            .embedding_service
            .query_embedding(query, &settings.embedding, &settings.cache)
            .await?;

        // Step 4: Hybrid retrieval
        let keywords = extract_keywords(query);
        let document_ids = request.document_ids.as_deref();
        let mut candidates = self
            .retriever
            .retrieve(&query_embedding, &keywords, &options, document_ids)
            .await?;

        info!("Retrieved {} candidate chunks", candidates.len());

        // Step 5: Metadata filtering
        if options.enhance_with_metadata {
            if let Some(filters) = request.filters.as_ref().filter(|f| !f.is_empty()) {
                candidates = apply_metadata_filters(candidates, filters);
            }
        }

        // Step 6: Ordering and truncation
        let mut ranked = if options.reranking {
            rerank_results(candidates, query_type, query)
        } else {
            order_by_similarity(candidates)
        };
        ranked.truncate(options.max_results);

        // Step 7: Context assembly and generation. An empty chunk list
        // still goes to the model with the explicit negative context.
        let assembled = assemble_context(&ranked, query_type);
        let prompt = build_prompt(&assembled.text, query, query_type);

        let answer = self
            .generation
            .generate(SYSTEM_PROMPT, &prompt, &llm_config)
            .await?;

        let prompt_tokens = token_counter::count_tokens(&prompt, &llm_config.model);
        let answer_tokens = token_counter::count_tokens(&answer, &llm_config.model);
        let total_tokens_used = prompt_tokens + answer_tokens;

        if let Ok(counter) = token_counter::TokenCounter::new(&llm_config.model) {
            debug!(
                "Estimated generation cost: ${:.4}",
                counter.estimate_cost(prompt_tokens, answer_tokens)
            );
        }

        // Step 8: Best-effort persistence of the answer
        if let Some(conversation_id) = &request.conversation_id {
            let mut metadata = HashMap::new();
            metadata.insert(
                "sources".to_string(),
                serde_json::to_value(&assembled.sources).unwrap_or_default(),
            );
            metadata.insert(
                "query_type".to_string(),
                serde_json::Value::String(query_type.label().to_string()),
            );

            let message = NewChatMessage {
                conversation_id: conversation_id.clone(),
                role: "assistant".to_string(),
                content: answer.clone(),
                metadata: Some(metadata),
            };

            if let Err(e) = self.message_store.append_message(&message).await {
                warn!("Failed to save answer to conversation history: {}", e);
            }
        }

        let processing_time = start_time.elapsed();
        let results_count = ranked.len();

        log_operation_success!(
            "rag_query",
            query_type = query_type.label(),
            results_count = results_count,
            total_tokens_used = total_tokens_used,
            processing_time_ms = processing_time.as_millis() as u64
        );

        Ok(RagResponse {
            response: answer,
            context: ranked.into_iter().map(|r| r.chunk).collect(),
            sources: assembled.sources,
            query_type: query_type.label().to_string(),
            metadata: RagResponseMetadata {
                results_count,
                total_tokens_used,
                processing_time_ms: processing_time.as_millis() as u64,
            },
        })
    }
}

/// Helper function to create a request carrying only a question
pub fn simple_request(query: &str) -> RagRequest {
    RagRequest {
        query: query.to_string(),
        conversation_id: None,
        document_ids: None,
        filters: None,
        options: None,
        model_config: None,
    }
}
