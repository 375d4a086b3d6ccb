use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::ApiError;
use crate::chat::ChatEngine;
use crate::rag::CorpusStore;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ChatEngine>,
    pub store: Arc<CorpusStore>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub corpus_chunks: usize,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve; callers must have loaded the corpus store first so no
/// request is accepted before the index is ready.
pub async fn start_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let session_id = request.session_id.unwrap_or_default();
    let prompt = request.prompt.unwrap_or_default();

    let response = state
        .engine
        .handle_turn(&session_id, &prompt)
        .await
        .map_err(|e| {
            let api_error = ApiError::from(e);
            if api_error.status_code() >= 500 {
                tracing::error!("Chat turn failed: {}", api_error);
            }
            api_error
        })?;

    Ok(Json(ChatResponse { response }))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        corpus_chunks: state.store.len(),
    })
}
