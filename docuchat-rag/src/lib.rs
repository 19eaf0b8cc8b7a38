//! Docuchat RAG - Retrieval-Augmented Generation pipeline
//!
//! This crate integrates with siumai to answer questions over indexed
//! document chunks: query classification, cache-backed embedding
//! acquisition, hybrid semantic+keyword retrieval, metadata filtering,
//! reranking and answer generation with source references.

pub mod classifier;
pub mod context;
pub mod embeddings;
pub mod keywords;
pub mod llm_client;
pub mod pipeline;
pub mod ranking;
pub mod retriever;
pub mod stores;
pub mod token_counter;
pub mod types;

pub use classifier::*;
pub use context::*;
pub use embeddings::*;
pub use keywords::*;
pub use llm_client::*;
pub use pipeline::*;
pub use ranking::*;
pub use retriever::*;
pub use stores::*;

// Re-export our own types with explicit names
pub use types::{
    merge_model_config, ChatMessage, ChunkMetadata, DateRange, DocumentChunk, LlmConfig,
    ModelConfigOverride, NewChatMessage, QueryFilters, QueryOptionsOverride, RagError,
    RagQueryOptions, RagRequest, RagResponse, RagResponseMetadata, RagResult, RagSettings,
    SearchResult, SourceReference,
};

// Re-export commonly used types from siumai
pub use siumai::prelude::LlmClient;
