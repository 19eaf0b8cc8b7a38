//! Request/response types for the HTTP API

use docuchat_rag::{
    DocumentChunk, ModelConfigOverride, QueryFilters, QueryOptionsOverride, RagRequest,
    RagResponse, RagResponseMetadata, SourceReference,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// RAG query request
#[derive(Debug, Deserialize, ToSchema)]
pub struct QueryRequest {
    /// The user's question (required, non-empty)
    #[schema(example = "Quelle est la définition de X ?")]
    pub query: String,
    /// Conversation to attach the generated answer to
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Restrict retrieval to these source documents
    #[serde(default)]
    pub document_ids: Option<Vec<String>>,
    /// Metadata filters (date range, source types, authors)
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub filters: Option<QueryFilters>,
    /// Per-request search option overrides
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub options: Option<QueryOptionsOverride>,
    /// Per-request generation model overrides
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub model_config: Option<ModelConfigOverride>,
}

impl From<QueryRequest> for RagRequest {
    fn from(request: QueryRequest) -> Self {
        RagRequest {
            query: request.query,
            conversation_id: request.conversation_id,
            document_ids: request.document_ids,
            filters: request.filters,
            options: request.options,
            model_config: request.model_config,
        }
    }
}

/// RAG query response
#[derive(Debug, Serialize, ToSchema)]
pub struct QueryResponse {
    /// Generated natural-language answer
    pub response: String,
    /// Chunks that made up the prompt context, in rank order
    #[schema(value_type = Vec<Object>)]
    pub context: Vec<DocumentChunk>,
    /// Source references, parallel to `context`
    #[schema(value_type = Vec<Object>)]
    pub sources: Vec<SourceReference>,
    /// Classified query type label
    #[schema(example = "factual")]
    pub query_type: String,
    /// Metadata about the generation
    #[schema(value_type = Object)]
    pub metadata: RagResponseMetadata,
}

impl From<RagResponse> for QueryResponse {
    fn from(response: RagResponse) -> Self {
        QueryResponse {
            response: response.response,
            context: response.context,
            sources: response.sources,
            query_type: response.query_type,
            metadata: response.metadata,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Stable machine-readable error code
    #[schema(example = "validation_error")]
    pub code: String,
}

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

/// Conversation history response
#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationMessagesResponse {
    #[schema(value_type = Vec<Object>)]
    pub messages: Vec<docuchat_rag::ChatMessage>,
    pub count: usize,
}
