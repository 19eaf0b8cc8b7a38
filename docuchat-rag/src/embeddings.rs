//! Embedding acquisition
//!
//! Obtains a vector representation of the query text, preferring the
//! persistent cache, and falls back to the configured embedding provider.

use crate::stores::{CacheWrite, EmbeddingCacheStore};
use crate::types::{CacheConfig, EmbeddingConfig, RagError, RagResult};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use siumai::prelude::*;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default endpoint for Hugging Face feature extraction
const HF_INFERENCE_BASE_URL: &str = "https://api-inference.huggingface.co";

/// External embedding provider: text + model configuration in, vector out
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str, config: &EmbeddingConfig) -> RagResult<Vec<f32>>;
}

/// Embedding generator dispatching to the configured provider
///
/// OpenAI embeddings go through the siumai client; Hugging Face models go
/// through the inference API's feature-extraction pipeline.
pub struct EmbeddingGenerator {
    http: reqwest::Client,
}

impl EmbeddingGenerator {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    async fn embed_openai(&self, text: &str, config: &EmbeddingConfig) -> RagResult<Vec<f32>> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| RagError::Config("OpenAI API key not found".to_string()))?;

        let client = LlmBuilder::new()
            .openai()
            .api_key(&api_key)
            .model(&config.model)
            .build()
            .await
            .map_err(|e| RagError::Embedding(format!("Failed to create OpenAI client: {}", e)))?;

        let embedding_client = client.as_embedding_capability().ok_or_else(|| {
            RagError::Config("OpenAI client does not support embeddings".to_string())
        })?;

        let response = embedding_client
            .embed(vec![text.to_string()])
            .await
            .map_err(|e| RagError::Embedding(format!("Embedding API call failed: {}", e)))?;

        match response.embeddings.into_iter().next() {
            Some(embedding) => Ok(embedding),
            None => Err(RagError::Embedding(
                "No embedding data returned".to_string(),
            )),
        }
    }

    async fn embed_huggingface(&self, text: &str, config: &EmbeddingConfig) -> RagResult<Vec<f32>> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| HF_INFERENCE_BASE_URL.to_string());
        let url = format!(
            "{}/pipeline/feature-extraction/{}",
            base_url.trim_end_matches('/'),
            config.model
        );

        let mut request = self.http.post(&url).json(&serde_json::json!({
            "inputs": text,
        }));

        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("HUGGINGFACE_API_KEY").ok());
        if let Some(key) = api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RagError::Embedding(format!("Embedding API call failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(RagError::Embedding(format!(
                "Embedding API returned status {}",
                response.status()
            )));
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RagError::Embedding(format!("Invalid embedding response: {}", e)))?;

        parse_feature_extraction(value)
    }
}

impl Default for EmbeddingGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for EmbeddingGenerator {
    async fn embed(&self, text: &str, config: &EmbeddingConfig) -> RagResult<Vec<f32>> {
        let embedding = match config.provider.as_str() {
            "openai" => self.embed_openai(text, config).await?,
            "huggingface" => self.embed_huggingface(text, config).await?,
            provider => {
                return Err(RagError::Config(format!(
                    "Unsupported embedding provider: {}",
                    provider
                )))
            }
        };

        if config.dimensions > 0 && embedding.len() != config.dimensions {
            return Err(RagError::Embedding(format!(
                "Embedding dimension mismatch: expected {}, got {}",
                config.dimensions,
                embedding.len()
            )));
        }

        Ok(embedding)
    }
}

/// Parse a feature-extraction response: either a flat vector or a
/// token-level matrix whose first row is taken as the sentence embedding.
fn parse_feature_extraction(value: serde_json::Value) -> RagResult<Vec<f32>> {
    let malformed = || RagError::Embedding("Invalid embedding response format".to_string());

    let rows = value.as_array().ok_or_else(malformed)?;
    if rows.is_empty() {
        return Err(malformed());
    }

    let flat: Option<Vec<f32>> = rows
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect();
    if let Some(embedding) = flat {
        return Ok(embedding);
    }

    rows[0]
        .as_array()
        .ok_or_else(malformed)?
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32).ok_or_else(malformed))
        .collect()
}

/// Deterministic cache key derived from normalized text and the model id
pub fn cache_key(text: &str, model: &str) -> String {
    format!("{}_{}", model, text.trim().to_lowercase())
}

/// L2-normalize a vector so its Euclidean norm equals 1.
///
/// A zero-magnitude vector is returned unchanged.
pub fn normalize_embedding(embedding: Vec<f32>) -> Vec<f32> {
    let magnitude: f32 = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
    if magnitude == 0.0 {
        warn!("Zero-magnitude embedding, skipping normalization");
        return embedding;
    }

    embedding.into_iter().map(|v| v / magnitude).collect()
}

/// Quantize a vector to two decimals to reduce cache storage size
pub fn quantize_embedding(embedding: &[f32]) -> Vec<f32> {
    embedding.iter().map(|v| (v * 100.0).round() / 100.0).collect()
}

/// Calculate cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Cache-aware embedding acquisition
pub struct EmbeddingService {
    provider: Arc<dyn EmbeddingProvider>,
    cache: Arc<dyn EmbeddingCacheStore>,
}

impl EmbeddingService {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, cache: Arc<dyn EmbeddingCacheStore>) -> Self {
        Self { provider, cache }
    }

    /// Obtain the query vector, preferring a cached value.
    ///
    /// Cache read and write failures are recovered locally (treated as a
    /// miss / best-effort write); a provider failure aborts the request.
    pub async fn query_embedding(
        &self,
        text: &str,
        embedding_config: &EmbeddingConfig,
        cache_config: &CacheConfig,
    ) -> RagResult<Vec<f32>> {
        let key = cache_key(text, &embedding_config.model);

        if cache_config.use_persistent_cache {
            match self.cache.get(&key).await {
                Ok(Some(entry)) if entry.expires_at > Utc::now() => {
                    debug!(key = %key, "Embedding cache hit");

                    // Fire-and-forget access counter update; a lost
                    // increment must not fail the request.
                    let cache = Arc::clone(&self.cache);
                    let touch_key = key.clone();
                    tokio::spawn(async move {
                        if let Err(e) = cache.touch(&touch_key).await {
                            warn!("Failed to increment cache access count: {}", e);
                        }
                    });

                    return Ok(entry.embedding);
                }
                Ok(_) => {
                    debug!(key = %key, "Embedding cache miss");
                }
                Err(e) => {
                    warn!("Embedding cache read failed, treating as miss: {}", e);
                }
            }
        }

        let mut embedding = self.provider.embed(text, embedding_config).await?;

        if cache_config.normalize_vectors {
            embedding = normalize_embedding(embedding);
        }

        if cache_config.use_persistent_cache {
            let stored = if cache_config.compression_enabled {
                quantize_embedding(&embedding)
            } else {
                embedding.clone()
            };

            let entry = CacheWrite {
                key,
                text: text.trim().to_lowercase(),
                model: embedding_config.model.clone(),
                embedding: stored,
                expires_at: Utc::now() + Duration::minutes(cache_config.ttl_minutes),
            };

            if let Err(e) = self.cache.put(&entry).await {
                warn!("Embedding cache write failed: {}", e);
            }
        }

        Ok(embedding)
    }
}
