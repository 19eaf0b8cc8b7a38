//! HTTP API integration tests
//!
//! Exercises the full request path (router, CORS, handlers, SQLite stores,
//! pipeline) with deterministic fakes for the external embedding and
//! generation providers.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use docuchat_rag::types::{EmbeddingConfig, LlmConfig};
use docuchat_rag::{
    ChunkMetadata, DocumentChunk, EmbeddingProvider, GenerationProvider, RagResult,
};
use docuchat_web::{create_app, AppState, WebConfig};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

struct FixedEmbeddingProvider {
    vector: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for FixedEmbeddingProvider {
    async fn embed(&self, _text: &str, _config: &EmbeddingConfig) -> RagResult<Vec<f32>> {
        Ok(self.vector.clone())
    }
}

struct FixedGenerationProvider {
    answer: String,
}

#[async_trait]
impl GenerationProvider for FixedGenerationProvider {
    async fn generate(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _config: &LlmConfig,
    ) -> RagResult<String> {
        Ok(self.answer.clone())
    }
}

async fn test_state() -> AppState {
    let config = WebConfig {
        database_url: "sqlite::memory:".to_string(),
        ..Default::default()
    };

    AppState::with_providers(
        config,
        Arc::new(FixedEmbeddingProvider {
            vector: vec![1.0, 0.0, 0.0],
        }),
        Arc::new(FixedGenerationProvider {
            answer: "La réponse générée. [1]".to_string(),
        }),
    )
    .await
    .unwrap()
}

fn chunk(id: &str, content: &str, title: &str) -> DocumentChunk {
    DocumentChunk {
        id: id.to_string(),
        document_id: Some("doc-1".to_string()),
        content: content.to_string(),
        chunk_index: 0,
        metadata: ChunkMetadata {
            title: Some(title.to_string()),
            source_type: Some("upload".to_string()),
            ..Default::default()
        },
    }
}

async fn seed_chunks(state: &AppState) {
    state
        .database
        .insert_chunk(
            &chunk("c1", "Le budget de la campagne est de 10 000 euros.", "Budget"),
            &[1.0, 0.0, 0.0],
        )
        .await
        .unwrap();
    state
        .database
        .insert_chunk(
            &chunk("c2", "Les étapes du processus de validation.", "Processus"),
            &[0.9, 0.1, 0.0],
        )
        .await
        .unwrap();
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_check_returns_ok() {
    let app = create_app(test_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn cors_preflight_is_answered_with_permissive_headers() {
    let app = create_app(test_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/query")
                .header(header::ORIGIN, "https://app.example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn empty_query_returns_400_with_error_body() {
    let app = create_app(test_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/query")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"query": "   "}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "validation_error");
    assert!(body["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn query_returns_answer_with_sources() {
    let state = test_state().await;
    seed_chunks(&state).await;
    let app = create_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/query")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"query": "Quel est le budget de la campagne ?"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body["response"], "La réponse générée. [1]");
    assert_eq!(body["query_type"], "factual");
    assert!(body["metadata"]["results_count"].as_u64().unwrap() >= 1);
    assert!(body["metadata"]["total_tokens_used"].as_u64().unwrap() > 0);

    let sources = body["sources"].as_array().unwrap();
    assert!(!sources.is_empty());
    assert_eq!(sources[0]["reference"], "[1]");
}

#[tokio::test]
async fn query_with_conversation_id_persists_history() {
    let state = test_state().await;
    seed_chunks(&state).await;
    let app = create_app(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/query")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"query": "Quel est le budget ?", "conversation_id": "conv-42"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/conversations/conv-42/messages")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["messages"][0]["role"], "assistant");
}

#[tokio::test]
async fn rag_settings_endpoint_returns_defaults() {
    let app = create_app(test_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/config/rag")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["options"]["max_results"], 5);
    let threshold = body["options"]["min_similarity_threshold"].as_f64().unwrap();
    assert!((threshold - 0.7).abs() < 1e-6);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = create_app(test_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"]["/api/query"].is_object());
}
