//! RAG query and conversation history handlers

use super::types::{ConversationMessagesResponse, ErrorResponse, QueryRequest, QueryResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use docuchat_rag::{MessageStore, RagError};
use tracing::{error, info};

/// Map a pipeline error to the HTTP status and JSON error body.
///
/// Validation errors are the caller's fault (400); every other fatal error
/// is a server error (500). Recovered errors never reach this point.
fn error_response(err: RagError) -> (StatusCode, Json<ErrorResponse>) {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: err.code().to_string(),
        }),
    )
}

/// Handle RAG queries
#[utoipa::path(
    post,
    path = "/api/query",
    tag = "Query",
    summary = "Ask a question",
    description = "Answer a question over the indexed documents using retrieval-augmented generation",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Question answered successfully", body = QueryResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Pipeline failure", body = ErrorResponse)
    )
)]
pub async fn rag_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, Json<ErrorResponse>)> {
    info!("Processing RAG query");

    match state.pipeline.process(request.into()).await {
        Ok(response) => {
            info!(
                "Query answered with {} sources in {}ms",
                response.sources.len(),
                response.metadata.processing_time_ms
            );
            Ok(Json(response.into()))
        }
        Err(e) => {
            error!("RAG query failed: {}", e);
            Err(error_response(e))
        }
    }
}

/// Get the messages of a conversation
#[utoipa::path(
    get,
    path = "/api/conversations/{conversation_id}/messages",
    tag = "Query",
    summary = "Get conversation history",
    description = "List the persisted messages of a conversation",
    params(
        ("conversation_id" = String, Path, description = "Conversation ID")
    ),
    responses(
        (status = 200, description = "Messages retrieved successfully", body = ConversationMessagesResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn get_conversation_messages(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<ConversationMessagesResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.database.list_messages(&conversation_id, 100).await {
        Ok(messages) => {
            let count = messages.len();
            Ok(Json(ConversationMessagesResponse { messages, count }))
        }
        Err(e) => {
            error!("Failed to load conversation {}: {}", conversation_id, e);
            Err(error_response(e))
        }
    }
}
