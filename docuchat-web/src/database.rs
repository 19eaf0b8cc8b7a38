//! SQLite-backed store implementations
//!
//! Implements the pipeline's collaborator traits (settings, embedding
//! cache, chunk search, messages) over a single sqlx connection pool.
//! Document chunks are written by the ingestion side and read-only here.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use docuchat_rag::{
    cosine_similarity, CachedEmbedding, CacheWrite, ChatMessage, ChunkMetadata, ChunkSearchStore,
    DocumentChunk, EmbeddingCacheStore, MessageStore, NewChatMessage, RagError, RagResult,
    RagSettings, SearchResult, SettingsStore,
};
use sqlx::{sqlite::SqliteConnectOptions, Row, SqlitePool};
use std::cmp::Ordering;
use std::str::FromStr;
use tracing::{debug, info};

use crate::{WebError, WebResult};

/// Database service backing all persistent pipeline collaborators
pub struct DatabaseService {
    pool: SqlitePool,
}

impl DatabaseService {
    /// Connect to the database and bootstrap the schema
    pub async fn new(database_url: &str) -> WebResult<Self> {
        info!("Connecting to database: {}", database_url);

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| WebError::Database(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true);

        // An in-memory database exists per connection, so the pool must
        // keep exactly one connection alive for the schema to survive.
        let pool = if database_url.contains(":memory:") {
            sqlx::sqlite::SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
        } else {
            SqlitePool::connect_with(options).await
        }
        .map_err(|e| WebError::Database(format!("Failed to connect to database: {}", e)))?;

        Self::create_tables(&pool).await?;
        info!("Database schema ready");

        Ok(Self { pool })
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_tables(pool: &SqlitePool) -> WebResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS rag_settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                value TEXT NOT NULL,
                updated_at TEXT DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to create rag_settings table: {}", e)))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS embeddings_cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                access_count INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| {
            WebError::Database(format!("Failed to create embeddings_cache table: {}", e))
        })?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS document_chunks (
                id TEXT PRIMARY KEY,
                document_id TEXT,
                content TEXT NOT NULL,
                embedding TEXT NOT NULL,
                chunk_index INTEGER NOT NULL DEFAULT 0,
                title TEXT,
                source_type TEXT,
                author TEXT,
                doc_date TEXT,
                is_definition INTEGER NOT NULL DEFAULT 0,
                contains_steps INTEGER NOT NULL DEFAULT 0,
                is_comparison INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| {
            WebError::Database(format!("Failed to create document_chunks table: {}", e))
        })?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_messages (
                id TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                metadata TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to create chat_messages table: {}", e)))?;

        Ok(())
    }

    /// Persist the RAG settings record (single row, last write wins)
    pub async fn save_settings(&self, settings: &RagSettings) -> RagResult<()> {
        let value = serde_json::to_string(settings)?;

        sqlx::query(
            "INSERT OR REPLACE INTO rag_settings (id, value, updated_at) VALUES (1, ?, ?)",
        )
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RagError::Storage(format!("Failed to save settings: {}", e)))?;

        Ok(())
    }

    /// Insert a document chunk (ingestion-side helper, used by tests and tooling)
    pub async fn insert_chunk(&self, chunk: &DocumentChunk, embedding: &[f32]) -> RagResult<()> {
        let embedding_json = serde_json::to_string(embedding)?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO document_chunks
                (id, document_id, content, embedding, chunk_index, title, source_type,
                 author, doc_date, is_definition, contains_steps, is_comparison)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&chunk.id)
        .bind(&chunk.document_id)
        .bind(&chunk.content)
        .bind(embedding_json)
        .bind(chunk.chunk_index as i64)
        .bind(&chunk.metadata.title)
        .bind(&chunk.metadata.source_type)
        .bind(&chunk.metadata.author)
        .bind(chunk.metadata.date.map(|d| d.to_string()))
        .bind(chunk.metadata.is_definition as i64)
        .bind(chunk.metadata.contains_steps as i64)
        .bind(chunk.metadata.is_comparison as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| RagError::Storage(format!("Failed to insert chunk: {}", e)))?;

        Ok(())
    }

    fn chunk_from_row(row: &sqlx::sqlite::SqliteRow) -> RagResult<(DocumentChunk, Vec<f32>)> {
        let embedding_json: String = row
            .try_get("embedding")
            .map_err(|e| RagError::Storage(format!("Failed to read embedding column: {}", e)))?;
        let embedding: Vec<f32> = serde_json::from_str(&embedding_json)?;

        let date: Option<String> = row.try_get("doc_date").unwrap_or(None);

        let chunk = DocumentChunk {
            id: row
                .try_get("id")
                .map_err(|e| RagError::Storage(format!("Failed to read id column: {}", e)))?,
            document_id: row.try_get("document_id").unwrap_or(None),
            content: row
                .try_get("content")
                .map_err(|e| RagError::Storage(format!("Failed to read content column: {}", e)))?,
            chunk_index: row.try_get::<i64, _>("chunk_index").unwrap_or(0) as usize,
            metadata: ChunkMetadata {
                title: row.try_get("title").unwrap_or(None),
                source_type: row.try_get("source_type").unwrap_or(None),
                author: row.try_get("author").unwrap_or(None),
                date: date.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
                is_definition: row.try_get::<i64, _>("is_definition").unwrap_or(0) != 0,
                contains_steps: row.try_get::<i64, _>("contains_steps").unwrap_or(0) != 0,
                is_comparison: row.try_get::<i64, _>("is_comparison").unwrap_or(0) != 0,
            },
        };

        Ok((chunk, embedding))
    }

    async fn fetch_chunks(
        &self,
        document_ids: Option<&[String]>,
    ) -> RagResult<Vec<sqlx::sqlite::SqliteRow>> {
        let rows = match document_ids {
            Some(ids) if !ids.is_empty() => {
                let placeholders = vec!["?"; ids.len()].join(", ");
                let sql = format!(
                    "SELECT * FROM document_chunks WHERE document_id IN ({})",
                    placeholders
                );
                let mut query = sqlx::query(&sql);
                for id in ids {
                    query = query.bind(id);
                }
                query.fetch_all(&self.pool).await
            }
            _ => {
                sqlx::query("SELECT * FROM document_chunks")
                    .fetch_all(&self.pool)
                    .await
            }
        };

        rows.map_err(|e| RagError::Storage(format!("Failed to load chunks: {}", e)))
    }
}

#[async_trait]
impl SettingsStore for DatabaseService {
    async fn load_settings(&self) -> RagResult<RagSettings> {
        let row = sqlx::query("SELECT value FROM rag_settings WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RagError::Storage(format!("Failed to load settings: {}", e)))?;

        match row {
            Some(row) => {
                let value: String = row
                    .try_get("value")
                    .map_err(|e| RagError::Storage(format!("Failed to read settings: {}", e)))?;
                Ok(serde_json::from_str(&value)?)
            }
            None => {
                debug!("No persisted RAG settings, using defaults");
                Ok(RagSettings::default())
            }
        }
    }
}

#[async_trait]
impl EmbeddingCacheStore for DatabaseService {
    async fn get(&self, key: &str) -> RagResult<Option<CachedEmbedding>> {
        let row = sqlx::query(
            "SELECT value, expires_at, access_count FROM embeddings_cache WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RagError::Storage(format!("Cache lookup failed: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let value: String = row
            .try_get("value")
            .map_err(|e| RagError::Storage(format!("Failed to read cache value: {}", e)))?;
        let value: serde_json::Value = serde_json::from_str(&value)?;

        let embedding: Vec<f32> = value
            .get("embedding")
            .cloned()
            .map(serde_json::from_value)
            .transpose()?
            .ok_or_else(|| RagError::Storage("Cache entry missing embedding".to_string()))?;

        let model = value
            .get("model")
            .and_then(|m| m.as_str())
            .unwrap_or_default()
            .to_string();

        let expires_at: String = row
            .try_get("expires_at")
            .map_err(|e| RagError::Storage(format!("Failed to read cache expiry: {}", e)))?;
        let expires_at = DateTime::parse_from_rfc3339(&expires_at)
            .map_err(|e| RagError::Storage(format!("Invalid cache expiry: {}", e)))?
            .with_timezone(&Utc);

        Ok(Some(CachedEmbedding {
            embedding,
            model,
            expires_at,
            access_count: row.try_get::<i64, _>("access_count").unwrap_or(0),
        }))
    }

    async fn put(&self, entry: &CacheWrite) -> RagResult<()> {
        let value = serde_json::json!({
            "embedding": entry.embedding,
            "text": entry.text,
            "model": entry.model,
        });

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO embeddings_cache (key, value, expires_at, access_count)
            VALUES (?, ?, ?, 1)
            "#,
        )
        .bind(&entry.key)
        .bind(value.to_string())
        .bind(entry.expires_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RagError::Storage(format!("Cache write failed: {}", e)))?;

        Ok(())
    }

    async fn touch(&self, key: &str) -> RagResult<()> {
        sqlx::query("UPDATE embeddings_cache SET access_count = access_count + 1 WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| RagError::Storage(format!("Cache touch failed: {}", e)))?;

        Ok(())
    }

    async fn purge_expired(&self) -> RagResult<u64> {
        let result = sqlx::query("DELETE FROM embeddings_cache WHERE expires_at <= ?")
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| RagError::Storage(format!("Cache purge failed: {}", e)))?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ChunkSearchStore for DatabaseService {
    async fn semantic_search(
        &self,
        query_embedding: &[f32],
        threshold: f32,
        count: usize,
        document_ids: Option<&[String]>,
    ) -> RagResult<Vec<SearchResult>> {
        let rows = self.fetch_chunks(document_ids).await?;

        let mut results = Vec::new();
        for row in &rows {
            let (chunk, embedding) = Self::chunk_from_row(row)?;
            let similarity = cosine_similarity(query_embedding, &embedding);
            if similarity >= threshold {
                results.push(SearchResult { chunk, similarity });
            }
        }

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });
        results.truncate(count);

        debug!(
            "Semantic search matched {} of {} chunks",
            results.len(),
            rows.len()
        );
        Ok(results)
    }

    async fn keyword_search(
        &self,
        terms: &[String],
        limit: usize,
        document_ids: Option<&[String]>,
    ) -> RagResult<Vec<DocumentChunk>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        // All terms must match: AND over LIKE clauses
        let mut conditions: Vec<String> = vec!["content LIKE ?".to_string(); terms.len()];
        if let Some(ids) = document_ids {
            if !ids.is_empty() {
                let placeholders = vec!["?"; ids.len()].join(", ");
                conditions.push(format!("document_id IN ({})", placeholders));
            }
        }

        let sql = format!(
            "SELECT * FROM document_chunks WHERE {} LIMIT ?",
            conditions.join(" AND ")
        );

        let mut query = sqlx::query(&sql);
        for term in terms {
            query = query.bind(format!("%{}%", term));
        }
        if let Some(ids) = document_ids {
            for id in ids {
                query = query.bind(id);
            }
        }
        query = query.bind(limit as i64);

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RagError::Storage(format!("Keyword search failed: {}", e)))?;

        let mut chunks = Vec::with_capacity(rows.len());
        for row in &rows {
            let (chunk, _) = Self::chunk_from_row(row)?;
            chunks.push(chunk);
        }

        Ok(chunks)
    }
}

#[async_trait]
impl MessageStore for DatabaseService {
    async fn append_message(&self, message: &NewChatMessage) -> RagResult<ChatMessage> {
        let stored = ChatMessage {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: message.conversation_id.clone(),
            role: message.role.clone(),
            content: message.content.clone(),
            created_at: Utc::now(),
            metadata: message.metadata.clone(),
        };

        let metadata_json = stored
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO chat_messages (id, conversation_id, role, content, metadata, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&stored.id)
        .bind(&stored.conversation_id)
        .bind(&stored.role)
        .bind(&stored.content)
        .bind(&metadata_json)
        .bind(stored.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RagError::Storage(format!("Failed to save message: {}", e)))?;

        Ok(stored)
    }

    async fn list_messages(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> RagResult<Vec<ChatMessage>> {
        let rows = sqlx::query(
            r#"
            SELECT id, conversation_id, role, content, metadata, created_at
            FROM chat_messages
            WHERE conversation_id = ?
            ORDER BY created_at ASC
            LIMIT ?
            "#,
        )
        .bind(conversation_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RagError::Storage(format!("Failed to load messages: {}", e)))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in rows {
            let metadata: Option<String> = row.try_get("metadata").unwrap_or(None);
            let created_at: String = row
                .try_get("created_at")
                .map_err(|e| RagError::Storage(format!("Failed to read timestamp: {}", e)))?;

            messages.push(ChatMessage {
                id: row
                    .try_get("id")
                    .map_err(|e| RagError::Storage(format!("Failed to read id: {}", e)))?,
                conversation_id: row.try_get("conversation_id").unwrap_or_default(),
                role: row.try_get("role").unwrap_or_default(),
                content: row.try_get("content").unwrap_or_default(),
                created_at: DateTime::parse_from_rfc3339(&created_at)
                    .map_err(|e| RagError::Storage(format!("Invalid timestamp: {}", e)))?
                    .with_timezone(&Utc),
                metadata: metadata.map(|m| serde_json::from_str(&m)).transpose()?,
            });
        }

        Ok(messages)
    }
}
