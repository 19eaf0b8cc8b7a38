//! Integration tests for docuchat-core

use docuchat_core::{DocuchatConfig, DocuchatError, ErrorContext};

#[test]
fn test_default_config_is_valid() {
    let config = DocuchatConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.embedding.provider, "openai");
    assert_eq!(config.cache.ttl_minutes, 60 * 24 * 7);
    assert!(config.cache.use_persistent_cache);
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("docuchat.toml");

    let config = DocuchatConfig::default();
    config.save_to_file(&path).unwrap();

    let loaded = DocuchatConfig::from_file(&path).unwrap();
    assert_eq!(loaded.embedding.model, config.embedding.model);
    assert_eq!(loaded.llm.provider, config.llm.provider);
    assert_eq!(loaded.cache.compression_enabled, config.cache.compression_enabled);
}

#[test]
fn test_config_validation_rejects_zero_dimensions() {
    let mut config = DocuchatConfig::default();
    config.embedding.dimensions = 0;

    let result = config.validate();
    assert!(result.is_err());
    assert_eq!(result.unwrap_err().code(), "config_error");
}

#[test]
fn test_config_validation_rejects_non_positive_ttl() {
    let mut config = DocuchatConfig::default();
    config.cache.ttl_minutes = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_missing_config_file_is_config_error() {
    let result = DocuchatConfig::from_file("/nonexistent/docuchat.toml");
    assert!(matches!(result, Err(DocuchatError::Config { .. })));
}

#[test]
fn test_error_codes_are_stable() {
    let validation = DocuchatError::Validation {
        message: "empty query".to_string(),
        field: Some("query".to_string()),
        context: ErrorContext::new("test"),
    };
    assert_eq!(validation.code(), "validation_error");
    assert!(!validation.is_recoverable());

    let storage = DocuchatError::Storage {
        message: "connection lost".to_string(),
        source: None,
        context: ErrorContext::new("test"),
    };
    assert_eq!(storage.code(), "storage_error");
    assert!(storage.is_recoverable());
}

#[test]
fn test_error_context_builder() {
    let context = ErrorContext::new("pipeline")
        .with_operation("embed_query")
        .with_metadata("model", "text-embedding-ada-002")
        .with_suggestion("Check the embedding provider credentials");

    assert_eq!(context.component, "pipeline");
    assert_eq!(context.operation.as_deref(), Some("embed_query"));
    assert_eq!(context.recovery_suggestions.len(), 1);
    assert!(!context.error_id.is_empty());
}
