//! Collaborator store abstractions
//!
//! The pipeline consumes its persistence collaborators as black boxes:
//! a settings store, an embedding cache, a chunk search interface and a
//! message store. Implementations live with the host application (the web
//! crate ships a SQLite-backed one); tests use in-memory fakes.

use crate::types::{
    ChatMessage, DocumentChunk, NewChatMessage, RagResult, RagSettings, SearchResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read access to the persisted RAG configuration.
///
/// The pipeline loads settings once per request so that every invocation
/// reflects the latest persisted record; implementations must not hide the
/// record behind ambient global state.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load_settings(&self) -> RagResult<RagSettings>;
}

/// A cached query embedding as returned from the cache store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedEmbedding {
    pub embedding: Vec<f32>,
    pub model: String,
    pub expires_at: DateTime<Utc>,
    pub access_count: i64,
}

/// A cache entry about to be written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheWrite {
    pub key: String,
    pub text: String,
    pub model: String,
    pub embedding: Vec<f32>,
    pub expires_at: DateTime<Utc>,
}

/// Persistent key-value cache for query embeddings with TTL semantics
#[async_trait]
pub trait EmbeddingCacheStore: Send + Sync {
    /// Look up an entry by key. Implementations may or may not filter
    /// expired rows; the caller re-checks `expires_at` either way.
    async fn get(&self, key: &str) -> RagResult<Option<CachedEmbedding>>;

    /// Upsert an entry. Concurrent writers for the same key are tolerated;
    /// last write wins.
    async fn put(&self, entry: &CacheWrite) -> RagResult<()>;

    /// Increment the access counter for a key. Best-effort; lost
    /// increments under races are acceptable.
    async fn touch(&self, key: &str) -> RagResult<()>;

    /// Delete expired entries, returning how many were removed
    async fn purge_expired(&self) -> RagResult<u64>;
}

/// Search access to the indexed document chunks.
///
/// Chunks are owned by the ingestion pipeline and read-only here.
#[async_trait]
pub trait ChunkSearchStore: Send + Sync {
    /// Vector-similarity search: ranked chunks with similarity >= threshold,
    /// at most `count` rows, optionally scoped to specific documents.
    async fn semantic_search(
        &self,
        query_embedding: &[f32],
        threshold: f32,
        count: usize,
        document_ids: Option<&[String]>,
    ) -> RagResult<Vec<SearchResult>>;

    /// Full-text search for chunks matching all of the given terms,
    /// at most `limit` rows.
    async fn keyword_search(
        &self,
        terms: &[String],
        limit: usize,
        document_ids: Option<&[String]>,
    ) -> RagResult<Vec<DocumentChunk>>;
}

/// Append/read access to conversation messages
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append_message(&self, message: &NewChatMessage) -> RagResult<ChatMessage>;

    async fn list_messages(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> RagResult<Vec<ChatMessage>>;
}
