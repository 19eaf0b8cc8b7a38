//! Application state

use crate::database::DatabaseService;
use crate::{WebConfig, WebError, WebResult};
use docuchat_rag::{
    ChunkSearchStore, DocuchatLlmClient, EmbeddingCacheStore, EmbeddingGenerator,
    EmbeddingProvider, GenerationProvider, MessageStore, RagPipeline, SettingsStore,
};
use std::sync::Arc;

/// Shared application state: the database-backed stores and the pipeline
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: WebConfig,
    /// Database service implementing the pipeline's persistence traits
    pub database: Arc<DatabaseService>,
    /// The RAG pipeline
    pub pipeline: Arc<RagPipeline>,
}

impl AppState {
    /// Create application state with the real embedding and generation providers
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        Self::with_providers(
            config,
            Arc::new(EmbeddingGenerator::new()),
            Arc::new(DocuchatLlmClient::new()),
        )
        .await
    }

    /// Create application state with injected providers.
    ///
    /// Tests use this to substitute deterministic fakes for the external
    /// embedding and generation services.
    pub async fn with_providers(
        config: WebConfig,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        generation: Arc<dyn GenerationProvider>,
    ) -> WebResult<Self> {
        let database = Arc::new(
            DatabaseService::new(&config.database_url)
                .await
                .map_err(|e| WebError::Config(format!("Failed to initialize database: {}", e)))?,
        );

        let settings_store: Arc<dyn SettingsStore> = database.clone();
        let cache_store: Arc<dyn EmbeddingCacheStore> = database.clone();
        let search_store: Arc<dyn ChunkSearchStore> = database.clone();
        let message_store: Arc<dyn MessageStore> = database.clone();

        let pipeline = Arc::new(RagPipeline::new(
            settings_store,
            cache_store,
            search_store,
            message_store,
            embedding_provider,
            generation,
        ));

        Ok(Self {
            config,
            database,
            pipeline,
        })
    }
}
