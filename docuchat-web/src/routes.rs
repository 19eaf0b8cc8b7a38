//! Route definitions for the docuchat web server

use crate::{handlers, openapi, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // RAG endpoint
        .route("/query", post(handlers::rag_query))
        // Conversation history
        .route(
            "/conversations/{conversation_id}/messages",
            get(handlers::get_conversation_messages),
        )
        // Configuration
        .route("/config/rag", get(handlers::get_rag_settings))
        // OpenAPI document
        .route("/openapi.json", get(openapi::openapi_json))
}
