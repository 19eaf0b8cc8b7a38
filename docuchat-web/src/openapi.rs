//! OpenAPI documentation

use crate::handlers;
use axum::response::Json;
use utoipa::OpenApi;

/// OpenAPI document for the docuchat HTTP API
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::query::rag_query,
        handlers::query::get_conversation_messages,
        handlers::config::get_rag_settings,
    ),
    components(schemas(
        handlers::types::QueryRequest,
        handlers::types::QueryResponse,
        handlers::types::ErrorResponse,
        handlers::types::HealthResponse,
        handlers::types::ConversationMessagesResponse,
    )),
    tags(
        (name = "Query", description = "RAG question answering"),
        (name = "Health", description = "Service health"),
        (name = "Config", description = "RAG configuration"),
    ),
    info(
        title = "Docuchat API",
        description = "Chat with your documents over retrieval-augmented generation",
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document as JSON
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_contains_query_path() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/query"));
        assert!(doc.paths.paths.contains_key("/api/health"));
    }
}
