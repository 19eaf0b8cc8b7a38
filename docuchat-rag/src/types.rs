//! Type definitions for the RAG system
//!
//! This module defines the core types used throughout the RAG pipeline.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use docuchat_core::{CacheConfig, EmbeddingConfig, LlmConfig};

/// A query submitted to the RAG pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagRequest {
    /// The user's question (must be non-empty)
    pub query: String,
    /// Conversation to attach the generated answer to
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Restrict retrieval to these source documents
    #[serde(default)]
    pub document_ids: Option<Vec<String>>,
    /// Metadata filters applied after retrieval
    #[serde(default)]
    pub filters: Option<QueryFilters>,
    /// Per-request overrides of the persisted search options
    #[serde(default)]
    pub options: Option<QueryOptionsOverride>,
    /// Per-request overrides of the generation model parameters
    #[serde(default)]
    pub model_config: Option<ModelConfigOverride>,
}

/// Inclusive date range filter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Caller-supplied metadata filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryFilters {
    #[serde(default)]
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub source_types: Option<Vec<String>>,
    #[serde(default)]
    pub authors: Option<Vec<String>>,
}

impl QueryFilters {
    /// True when no filter criterion was supplied at all
    pub fn is_empty(&self) -> bool {
        self.date_range.is_none() && self.source_types.is_none() && self.authors.is_none()
    }
}

/// Tunables steering a single retrieval run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagQueryOptions {
    /// Combine semantic search with keyword/full-text search
    pub use_hybrid_search: bool,
    /// Classify the question to steer ranking and prompt framing
    pub use_query_classification: bool,
    /// Apply caller-supplied metadata filters
    pub enhance_with_metadata: bool,
    /// Minimum similarity threshold (0-1)
    pub min_similarity_threshold: f32,
    /// Maximum number of results returned to the caller
    pub max_results: usize,
    /// Rerank results after retrieval
    pub reranking: bool,
}

impl Default for RagQueryOptions {
    fn default() -> Self {
        Self {
            use_hybrid_search: true,
            use_query_classification: true,
            enhance_with_metadata: true,
            min_similarity_threshold: 0.7,
            max_results: 5,
            reranking: true,
        }
    }
}

/// Per-request option overrides; unset fields fall back to the persisted settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptionsOverride {
    #[serde(default)]
    pub hybrid_search: Option<bool>,
    #[serde(default)]
    pub use_query_classification: Option<bool>,
    #[serde(default)]
    pub enhance_with_metadata: Option<bool>,
    #[serde(default)]
    pub min_similarity_threshold: Option<f32>,
    #[serde(default)]
    pub max_results: Option<usize>,
    #[serde(default)]
    pub reranking: Option<bool>,
}

impl RagQueryOptions {
    /// Merge per-request overrides over the persisted defaults
    pub fn merged_with(&self, overrides: Option<&QueryOptionsOverride>) -> Self {
        let Some(o) = overrides else {
            return self.clone();
        };
        Self {
            use_hybrid_search: o.hybrid_search.unwrap_or(self.use_hybrid_search),
            use_query_classification: o
                .use_query_classification
                .unwrap_or(self.use_query_classification),
            enhance_with_metadata: o.enhance_with_metadata.unwrap_or(self.enhance_with_metadata),
            min_similarity_threshold: o
                .min_similarity_threshold
                .unwrap_or(self.min_similarity_threshold),
            max_results: o.max_results.unwrap_or(self.max_results),
            reranking: o.reranking.unwrap_or(self.reranking),
        }
    }
}

/// Per-request generation model overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfigOverride {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// Merge per-request model overrides over the persisted LLM configuration
pub fn merge_model_config(base: &LlmConfig, overrides: Option<&ModelConfigOverride>) -> LlmConfig {
    let mut config = base.clone();
    if let Some(o) = overrides {
        if let Some(model) = &o.model {
            config.model = model.clone();
        }
        if let Some(temperature) = o.temperature {
            config.temperature = temperature;
        }
        if let Some(max_tokens) = o.max_tokens {
            config.max_tokens = Some(max_tokens);
        }
    }
    config
}

/// Structured metadata attached to a document chunk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Structural flag: the chunk contains a definition
    #[serde(default)]
    pub is_definition: bool,
    /// Structural flag: the chunk contains step-by-step instructions
    #[serde(default)]
    pub contains_steps: bool,
    /// Structural flag: the chunk contains a comparison
    #[serde(default)]
    pub is_comparison: bool,
}

/// A persisted slice of a source document, read-only from the pipeline's perspective
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Unique identifier
    pub id: String,
    /// Source document ID
    pub document_id: Option<String>,
    /// Text content
    pub content: String,
    /// Chunk index within the document
    pub chunk_index: usize,
    /// Structured metadata
    pub metadata: ChunkMetadata,
}

/// A document chunk annotated with its similarity score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: DocumentChunk,
    /// Cosine similarity score; 0.6 placeholder for keyword-only hits
    pub similarity: f32,
}

/// A bracketed source reference included alongside the generated answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReference {
    /// Reference marker, e.g. "[1]"
    pub reference: String,
    pub title: String,
    pub source: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// The complete answer produced by the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagResponse {
    /// Generated natural-language answer
    pub response: String,
    /// Chunks that made up the prompt context, in rank order
    pub context: Vec<DocumentChunk>,
    /// Source references, parallel to `context`
    pub sources: Vec<SourceReference>,
    /// Classified query type label
    pub query_type: String,
    /// Metadata about the generation
    pub metadata: RagResponseMetadata,
}

/// Metadata about the RAG response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagResponseMetadata {
    /// Number of chunks in the final context
    pub results_count: usize,
    /// Estimated tokens consumed by prompt + answer
    pub total_tokens_used: usize,
    /// End-to-end processing time (ms)
    pub processing_time_ms: u64,
}

/// The persisted RAG configuration record, loaded fresh on every request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagSettings {
    /// Default search options
    pub options: RagQueryOptions,
    /// Embedding cache behaviour
    pub cache: CacheConfig,
    /// Embedding provider configuration
    pub embedding: EmbeddingConfig,
    /// Generation model configuration
    pub llm: LlmConfig,
}

impl Default for RagSettings {
    fn default() -> Self {
        let core = docuchat_core::DocuchatConfig::default();
        Self {
            options: RagQueryOptions::default(),
            cache: core.cache,
            embedding: core.embedding,
            llm: core.llm,
        }
    }
}

/// Chat message persisted in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message ID
    pub id: String,
    /// Conversation this message belongs to
    pub conversation_id: String,
    /// Role: "user" or "assistant"
    pub role: String,
    /// Message content
    pub content: String,
    /// Timestamp
    pub created_at: DateTime<Utc>,
    /// Optional metadata (sources, query type)
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

/// A message about to be persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChatMessage {
    pub conversation_id: String,
    pub role: String,
    pub content: String,
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

/// Error types for the RAG system
#[derive(Debug, thiserror::Error)]
pub enum RagError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Core error: {0}")]
    Core(Box<docuchat_core::DocuchatError>),
}

impl From<docuchat_core::DocuchatError> for RagError {
    fn from(err: docuchat_core::DocuchatError) -> Self {
        RagError::Core(Box::new(err))
    }
}

impl RagError {
    /// Stable machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            RagError::Validation(_) => "validation_error",
            RagError::Embedding(_) => "embedding_error",
            RagError::Search(_) => "search_error",
            RagError::Generation(_) => "generation_error",
            RagError::Storage(_) => "storage_error",
            RagError::Config(_) => "config_error",
            RagError::Serialization(_) => "serialization_error",
            RagError::Core(err) => err.code(),
        }
    }

    /// True for errors caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(self, RagError::Validation(_))
    }
}

pub type RagResult<T> = Result<T, RagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = RagQueryOptions::default();
        assert!(options.use_hybrid_search);
        assert!(options.use_query_classification);
        assert!(options.enhance_with_metadata);
        assert_eq!(options.min_similarity_threshold, 0.7);
        assert_eq!(options.max_results, 5);
        assert!(options.reranking);
    }

    #[test]
    fn test_options_merge_overrides_only_set_fields() {
        let defaults = RagQueryOptions::default();
        let overrides = QueryOptionsOverride {
            hybrid_search: Some(false),
            max_results: Some(10),
            ..Default::default()
        };

        let merged = defaults.merged_with(Some(&overrides));
        assert!(!merged.use_hybrid_search);
        assert_eq!(merged.max_results, 10);
        // Untouched fields keep the persisted defaults
        assert!(merged.use_query_classification);
        assert_eq!(merged.min_similarity_threshold, 0.7);
    }

    #[test]
    fn test_model_config_merge() {
        let base = RagSettings::default().llm;
        let merged = merge_model_config(
            &base,
            Some(&ModelConfigOverride {
                model: Some("gpt-4o-mini".to_string()),
                temperature: Some(0.2),
                max_tokens: None,
            }),
        );
        assert_eq!(merged.model, "gpt-4o-mini");
        assert_eq!(merged.temperature, 0.2);
        assert_eq!(merged.max_tokens, base.max_tokens);
    }

    #[test]
    fn test_empty_filters() {
        assert!(QueryFilters::default().is_empty());
        let filters = QueryFilters {
            authors: Some(vec!["Martin".to_string()]),
            ..Default::default()
        };
        assert!(!filters.is_empty());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            RagError::Validation("empty".to_string()).code(),
            "validation_error"
        );
        assert_eq!(
            RagError::Embedding("provider down".to_string()).code(),
            "embedding_error"
        );
        assert!(RagError::Validation("empty".to_string()).is_client_error());
        assert!(!RagError::Search("rpc failed".to_string()).is_client_error());
    }
}
