//! Configuration management

use crate::error::{DocuchatError, DocuchatResult};
use crate::types::DocuchatConfig;

use std::path::Path;

impl Default for DocuchatConfig {
    fn default() -> Self {
        Self {
            embedding: crate::types::EmbeddingConfig {
                provider: "openai".to_string(),
                model: "text-embedding-ada-002".to_string(),
                api_key: None,
                base_url: None,
                dimensions: 1536,
            },
            llm: crate::types::LlmConfig {
                provider: "openai".to_string(),
                model: "gpt-4o".to_string(),
                api_key: None,
                base_url: None,
                temperature: 0.7,
                max_tokens: Some(2000),
            },
            cache: crate::types::CacheConfig {
                use_persistent_cache: true,
                ttl_minutes: 60 * 24 * 7, // one week
                normalize_vectors: true,
                compression_enabled: true,
            },
            storage: crate::types::StorageConfig {
                database_url: "sqlite::memory:".to_string(),
            },
        }
    }
}

impl DocuchatConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> DocuchatResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DocuchatError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: DocuchatConfig = toml::from_str(&content).map_err(|e| DocuchatError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> DocuchatResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| DocuchatError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| DocuchatError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: crate::ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> DocuchatResult<()> {
        if self.embedding.dimensions == 0 {
            return Err(DocuchatError::Config {
                message: "Embedding dimensions must be greater than 0".to_string(),
                source: None,
                context: crate::ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set embedding.dimensions to a positive value"),
            });
        }

        if self.cache.ttl_minutes <= 0 {
            return Err(DocuchatError::Config {
                message: "Cache TTL must be greater than 0 minutes".to_string(),
                source: None,
                context: crate::ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set cache.ttl_minutes to a positive value"),
            });
        }

        if let Some(max_tokens) = self.llm.max_tokens {
            if max_tokens == 0 {
                return Err(DocuchatError::Config {
                    message: "LLM max_tokens must be greater than 0".to_string(),
                    source: None,
                    context: crate::ErrorContext::new("config")
                        .with_operation("validate")
                        .with_suggestion("Set llm.max_tokens to a positive value"),
                });
            }
        }

        Ok(())
    }
}
