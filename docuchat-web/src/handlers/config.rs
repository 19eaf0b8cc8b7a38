//! Configuration handlers

use super::types::ErrorResponse;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use docuchat_rag::{RagSettings, SettingsStore};
use tracing::error;

/// Get the active RAG settings
#[utoipa::path(
    get,
    path = "/api/config/rag",
    tag = "Config",
    summary = "Get RAG settings",
    description = "Return the persisted RAG configuration record (or the defaults if none is stored)",
    responses(
        (status = 200, description = "Active settings"),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn get_rag_settings(
    State(state): State<AppState>,
) -> Result<Json<RagSettings>, (StatusCode, Json<ErrorResponse>)> {
    match state.database.load_settings().await {
        Ok(settings) => Ok(Json(settings)),
        Err(e) => {
            error!("Failed to load RAG settings: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                    code: e.code().to_string(),
                }),
            ))
        }
    }
}
