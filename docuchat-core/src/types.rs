//! Core data type definitions

use serde::{Deserialize, Serialize};

/// Top-level configuration for the docuchat system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocuchatConfig {
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub cache: CacheConfig,
    pub storage: StorageConfig,
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding provider (openai, huggingface)
    pub provider: String,
    /// Embedding model name
    pub model: String,
    /// API key (optional, can be set via environment)
    pub api_key: Option<String>,
    /// Base URL for custom endpoints
    pub base_url: Option<String>,
    /// Dimension of embeddings
    pub dimensions: usize,
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider type (openai, anthropic, ollama, groq)
    pub provider: String,
    /// Model name
    pub model: String,
    /// API key (optional, can be set via environment)
    pub api_key: Option<String>,
    /// Base URL for custom providers
    pub base_url: Option<String>,
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

/// Embedding cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether the persistent cache is consulted at all
    pub use_persistent_cache: bool,
    /// Time-to-live for cache entries, in minutes
    pub ttl_minutes: i64,
    /// Whether query vectors are L2-normalized after generation
    pub normalize_vectors: bool,
    /// Whether vectors are quantized to two decimals before caching
    pub compression_enabled: bool,
}

/// Persistent storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database connection URL
    pub database_url: String,
}
