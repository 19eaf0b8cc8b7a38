//! LLM client integration using siumai
//!
//! Provides a unified interface for invoking the configured text-generation
//! provider with the assembled prompt.

use crate::types::{LlmConfig, RagError, RagResult};
use async_trait::async_trait;
use siumai::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

/// External text-generation provider: prompt + model parameters in,
/// generated text out.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        config: &LlmConfig,
    ) -> RagResult<String>;
}

/// Generation client over the siumai provider builders.
///
/// The client is rebuilt from the configuration on every call so that each
/// request honours the latest persisted settings and per-request model
/// overrides.
pub struct DocuchatLlmClient;

impl DocuchatLlmClient {
    pub fn new() -> Self {
        Self
    }

    /// Build the appropriate siumai client based on configuration
    async fn build_client(config: &LlmConfig) -> RagResult<Box<dyn LlmClient>> {
        match config.provider.as_str() {
            "openai" => {
                let api_key = config
                    .api_key
                    .clone()
                    .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                    .ok_or_else(|| RagError::Config("OpenAI API key not found".to_string()))?;

                let mut builder = LlmBuilder::new()
                    .openai()
                    .api_key(&api_key)
                    .model(&config.model)
                    .temperature(config.temperature);

                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                if let Some(base_url) = &config.base_url {
                    builder = builder.base_url(base_url);
                }

                let client = builder.build().await.map_err(|e| {
                    RagError::Generation(format!("Failed to build OpenAI client: {}", e))
                })?;

                Ok(Box::new(client))
            }
            "anthropic" => {
                let api_key = config
                    .api_key
                    .clone()
                    .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
                    .ok_or_else(|| RagError::Config("Anthropic API key not found".to_string()))?;

                let mut builder = LlmBuilder::new()
                    .anthropic()
                    .api_key(&api_key)
                    .model(&config.model)
                    .temperature(config.temperature);

                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder.build().await.map_err(|e| {
                    RagError::Generation(format!("Failed to build Anthropic client: {}", e))
                })?;

                Ok(Box::new(client))
            }
            "ollama" => {
                let base_url = config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "http://localhost:11434".to_string());

                let mut builder = LlmBuilder::new()
                    .ollama()
                    .model(&config.model)
                    .base_url(&base_url)
                    .temperature(config.temperature);

                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder.build().await.map_err(|e| {
                    RagError::Generation(format!("Failed to build Ollama client: {}", e))
                })?;

                Ok(Box::new(client))
            }
            "groq" => {
                let api_key = config
                    .api_key
                    .clone()
                    .or_else(|| std::env::var("GROQ_API_KEY").ok())
                    .ok_or_else(|| RagError::Config("Groq API key not found".to_string()))?;

                let mut builder = LlmBuilder::new()
                    .groq()
                    .api_key(&api_key)
                    .model(&config.model)
                    .temperature(config.temperature);

                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder.build().await.map_err(|e| {
                    RagError::Generation(format!("Failed to build Groq client: {}", e))
                })?;

                Ok(Box::new(client))
            }
            provider => Err(RagError::Config(format!(
                "Unsupported LLM provider: {}",
                provider
            ))),
        }
    }
}

impl Default for DocuchatLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationProvider for DocuchatLlmClient {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        config: &LlmConfig,
    ) -> RagResult<String> {
        let start_time = Instant::now();

        debug!(
            "Generating response with provider {} and model {}",
            config.provider, config.model
        );

        let client = Self::build_client(config).await?;
        let messages = vec![system!(system_prompt), user!(user_prompt)];

        let response = client
            .chat(messages)
            .await
            .map_err(|e| RagError::Generation(format!("LLM generation failed: {}", e)))?;

        let generation_time = start_time.elapsed();

        if let Some(content) = response.content_text() {
            info!(
                "Generated response in {:?} ({} chars)",
                generation_time,
                content.len()
            );
            Ok(content.to_string())
        } else {
            Err(RagError::Generation(
                "No text content in LLM response".to_string(),
            ))
        }
    }
}

/// Helper functions for creating common LLM configurations
pub mod configs {
    use super::*;

    /// Create OpenAI GPT-4o configuration
    pub fn openai_gpt4o() -> LlmConfig {
        LlmConfig {
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: Some(2000),
        }
    }

    /// Create Anthropic Claude Haiku configuration
    pub fn anthropic_claude_haiku() -> LlmConfig {
        LlmConfig {
            provider: "anthropic".to_string(),
            model: "claude-3-5-haiku-latest".to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: Some(2000),
        }
    }

    /// Create Ollama configuration
    pub fn ollama_llama3(base_url: Option<String>) -> LlmConfig {
        LlmConfig {
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            api_key: None,
            base_url: base_url.or_else(|| Some("http://localhost:11434".to_string())),
            temperature: 0.7,
            max_tokens: Some(2000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_helpers() {
        let openai = configs::openai_gpt4o();
        assert_eq!(openai.provider, "openai");
        assert_eq!(openai.model, "gpt-4o");

        let ollama = configs::ollama_llama3(None);
        assert_eq!(ollama.base_url.as_deref(), Some("http://localhost:11434"));
    }

    #[tokio::test]
    async fn test_unsupported_provider_is_config_error() {
        let config = LlmConfig {
            provider: "mystery".to_string(),
            model: "m".to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: None,
        };

        let result = DocuchatLlmClient::build_client(&config).await;
        assert!(matches!(result, Err(RagError::Config(_))));
    }
}
