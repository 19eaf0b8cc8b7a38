//! Docuchat Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use docuchat_rag::EmbeddingCacheStore;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Main docuchat web server
pub struct DocuchatServer {
    config: WebConfig,
    state: AppState,
}

impl DocuchatServer {
    /// Create a new server
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone()).await?;

        Ok(Self { config, state })
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("Starting docuchat web server");
        info!("Server address: http://{}", address);
        info!("Development mode: {}", self.config.dev_mode);

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        // Periodic cleanup of expired embedding cache entries
        let cleanup_database = self.state.database.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(3600));
            loop {
                interval.tick().await;
                match cleanup_database.purge_expired().await {
                    Ok(purged) if purged > 0 => {
                        info!("Purged {} expired embedding cache entries", purged)
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Cache cleanup failed: {}", e),
                }
            }
        });

        if let Err(e) = serve(listener, app).await {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Builder for DocuchatServer
pub struct DocuchatServerBuilder {
    config: WebConfig,
}

impl DocuchatServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: WebConfig::default(),
        }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enable development mode
    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    /// Set database URL
    pub fn database_url<S: Into<String>>(mut self, database_url: S) -> Self {
        self.config.database_url = database_url.into();
        self
    }

    /// Build the server
    pub async fn build(self) -> WebResult<DocuchatServer> {
        DocuchatServer::new(self.config).await
    }
}

impl Default for DocuchatServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to start a server with configuration from the environment
pub async fn start_server() -> WebResult<()> {
    let config = WebConfig::from_env();
    let server = DocuchatServer::new(config).await?;
    server.start().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_creation() {
        let config = WebConfig::default();
        let server = DocuchatServer::new(config).await;
        assert!(server.is_ok());
    }

    #[test]
    fn test_server_builder() {
        let builder = DocuchatServerBuilder::new()
            .host("localhost")
            .port(3000)
            .dev_mode(true);

        assert_eq!(builder.config.host, "localhost");
        assert_eq!(builder.config.port, 3000);
        assert!(builder.config.dev_mode);
    }
}
